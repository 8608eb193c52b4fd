//! Owning 2D texel grids.
//!
//! A [`FrameBuffer`] is used both as a render target (color, depth, shadow
//! map) and as a texture sampled by fragment shaders.

use super::sampling::{self, SamplerMode};
use crate::aabb::Aabb2;
use crate::math::{Lerp, Vec2};

/// A `width`×`height` grid of `T`, stored row by row.
///
/// Row 0 is the bottom of the image: the viewport maps NDC y = -1 there.
#[derive(Debug, Clone)]
pub struct FrameBuffer<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
    clear_value: T,
}

impl<T: Copy> FrameBuffer<T> {
    /// Creates a buffer with every texel set to `clear_value`.
    pub fn new(width: usize, height: usize, clear_value: T) -> Self {
        Self {
            data: vec![clear_value; width * height],
            width,
            height,
            clear_value,
        }
    }

    /// Wraps existing texels.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height`.
    pub fn from_texels(width: usize, height: usize, data: Vec<T>, clear_value: T) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "texel count doesn't match dimensions"
        );
        Self {
            data,
            width,
            height,
            clear_value,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear_value(&self) -> T {
        self.clear_value
    }

    /// Texel at column `x`, row `y`.
    ///
    /// Callers guarantee `x < width` and `y < height`; a row overflow panics,
    /// a column overflow is only caught in debug builds.
    #[inline]
    pub fn at_texel(&self, x: usize, y: usize) -> T {
        debug_assert!(x < self.width, "x = {x} out of bounds (width {})", self.width);
        self.data[x + self.width * y]
    }

    #[inline]
    pub fn at_texel_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(x < self.width, "x = {x} out of bounds (width {})", self.width);
        &mut self.data[x + self.width * y]
    }

    #[inline]
    pub fn at_index(&self, index: usize) -> T {
        self.data[index]
    }

    #[inline]
    pub fn at_index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }

    /// Resets every texel to the clear value.
    pub fn clear(&mut self) {
        self.data.fill(self.clear_value);
    }

    /// The screen-space box `[0, 0]..[width, height]`.
    pub fn bounds(&self) -> Aabb2 {
        Aabb2::new(
            Vec2::ZERO,
            Vec2::new(self.width as f32, self.height as f32),
        )
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Rows from top to bottom, the order image files and displays expect.
    pub fn rows_top_down(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks_exact(self.width.max(1)).rev()
    }
}

impl<T: Lerp> FrameBuffer<T> {
    /// Samples at texture coordinates wrapped into `[0, 1)`.
    ///
    /// An empty buffer has nothing to sample and returns its clear value.
    pub fn at_uv(&self, u: f32, v: f32, mode: SamplerMode) -> T {
        if self.data.is_empty() {
            return self.clear_value;
        }
        let u = sampling::wrap_uv(u);
        let v = sampling::wrap_uv(v);

        match mode {
            SamplerMode::Nearest => {
                let x = ((u * self.width as f32) as usize).min(self.width - 1);
                let y = ((v * self.height as f32) as usize).min(self.height - 1);
                self.at_texel(x, y)
            }
            SamplerMode::Bilinear => {
                sampling::bilinear(u, v, self.width, self.height, |x, y| self.at_texel(x, y))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gradient(width: usize, height: usize) -> FrameBuffer<f32> {
        let texels = (0..width * height).map(|i| i as f32).collect();
        FrameBuffer::from_texels(width, height, texels, 0.0)
    }

    #[test]
    fn texel_and_index_access_agree() {
        let mut fb = FrameBuffer::new(4, 3, 0u32);
        *fb.at_texel_mut(1, 2) = 7;
        assert_eq!(fb.at_index(9), 7);
        *fb.at_index_mut(0) = 3;
        assert_eq!(fb.at_texel(0, 0), 3);
    }

    #[test]
    fn clear_restores_clear_value() {
        let mut fb = FrameBuffer::new(2, 2, 1.5f32);
        *fb.at_texel_mut(1, 1) = 0.0;
        fb.clear();
        assert!(fb.as_slice().iter().all(|&t| t == 1.5));
    }

    #[test]
    fn bounds_cover_whole_buffer() {
        let fb = FrameBuffer::new(640, 480, 0u8);
        assert_eq!(fb.bounds().min, Vec2::ZERO);
        assert_eq!(fb.bounds().max, Vec2::new(640.0, 480.0));
    }

    #[test]
    fn nearest_sampling_wraps() {
        let fb = gradient(4, 4);
        assert_eq!(fb.at_uv(0.3, 0.6, SamplerMode::Nearest), fb.at_texel(1, 2));
        assert_eq!(fb.at_uv(1.3, -0.4, SamplerMode::Nearest), fb.at_texel(1, 2));
    }

    #[test]
    fn bilinear_at_texel_center_is_exact() {
        let fb = gradient(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                let u = (x as f32 + 0.5) / 4.0;
                let v = (y as f32 + 0.5) / 4.0;
                assert_eq!(fb.at_uv(u, v, SamplerMode::Bilinear), fb.at_texel(x, y));
            }
        }
    }

    #[test]
    fn bilinear_between_centers_blends() {
        let fb = gradient(4, 4);
        // Halfway between texels (1, 1) = 5 and (2, 1) = 6.
        let value = fb.at_uv(0.5, 0.375, SamplerMode::Bilinear);
        assert_relative_eq!(value, 5.5);
    }

    #[test]
    fn rows_top_down_reverses_storage_order() {
        let fb = gradient(2, 3);
        let rows: Vec<&[f32]> = fb.rows_top_down().collect();
        assert_eq!(rows[0], &[4.0, 5.0]);
        assert_eq!(rows[2], &[0.0, 1.0]);
    }

    #[test]
    fn sampling_an_empty_buffer_returns_clear_value() {
        let fb = FrameBuffer::new(0, 0, 0.75f32);
        assert_eq!(fb.at_uv(0.3, 0.6, SamplerMode::Nearest), 0.75);
        assert_eq!(fb.at_uv(0.3, 0.6, SamplerMode::Bilinear), 0.75);
    }
}
