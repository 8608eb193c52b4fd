//! Image textures.
//!
//! Textures are plain [`FrameBuffer<Vec3>`]s holding linear RGB in `[0, 1]`,
//! sampled through [`FrameBuffer::at_uv`]. The decoded pixels are owned by the
//! buffer and freed with it.

use std::path::Path;

use image::RgbImage;
use log::info;

use crate::error::LoadError;
use crate::math::Vec3;
use crate::render::FrameBuffer;

pub type Texture = FrameBuffer<Vec3>;

impl FrameBuffer<Vec3> {
    /// Load a texture from an image file (PNG, JPG, BMP).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgb8();
        info!(
            "Loaded texture {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Ok(Self::from_image(&img))
    }

    /// Convert decoded pixels into a texture.
    ///
    /// # UV Coordinate Convention
    /// Images are stored top row first while `v = 0` is the bottom of the
    /// texture, so rows are flipped on the way in.
    pub fn from_image(img: &RgbImage) -> Self {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let texels = img
            .rows()
            .rev()
            .flat_map(|row| {
                row.map(|p| {
                    let [r, g, b] = p.0;
                    Vec3::new(r as f32, g as f32, b as f32) / 255.0
                })
            })
            .collect();
        Self::from_texels(width, height, texels, Vec3::ZERO)
    }

    /// 1×1 texture of a single color.
    pub fn solid(color: Vec3) -> Self {
        Self::new(1, 1, color)
    }

    /// Neutral texture used when a model has none.
    pub fn white() -> Self {
        Self::solid(Vec3::ONE)
    }
}
