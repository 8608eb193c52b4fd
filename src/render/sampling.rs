//! Texture filtering.

use crate::math::Lerp;

/// Sub-texel fraction treated as landing exactly on a texel center.
const TEXEL_SNAP: f32 = 1e-4;

/// How [`FrameBuffer::at_uv`](super::FrameBuffer::at_uv) reconstructs a value
/// between texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplerMode {
    /// Returns the texel containing the sample point.
    #[default]
    Nearest,
    /// Blends the four texels around the sample point by its sub-texel offset.
    Bilinear,
}

/// Wraps a texture coordinate into `[0, 1)`.
#[inline]
pub fn wrap_uv(t: f32) -> f32 {
    let wrapped = t.fract();
    if wrapped < 0.0 {
        // -1e-9 + 1.0 rounds to 1.0 in f32
        (wrapped + 1.0).min(1.0 - f32::EPSILON)
    } else {
        wrapped
    }
}

/// Splits a texel-space coordinate into the lower texel index and the
/// fraction toward the next one.
///
/// Texel `i` covers `[i, i + 1)` with its center at `i + 0.5`. Fractions
/// within `TEXEL_SNAP` of a center snap onto it so samples taken at texel
/// centers return that texel unblended.
#[inline]
fn split_texel(coordinate: f32) -> (i64, f32) {
    let centered = coordinate - 0.5;
    let base = centered.floor();
    let fraction = centered - base;
    if fraction < TEXEL_SNAP {
        (base as i64, 0.0)
    } else if fraction > 1.0 - TEXEL_SNAP {
        (base as i64 + 1, 0.0)
    } else {
        (base as i64, fraction)
    }
}

/// Bilinear reconstruction at wrapped `(u, v)` over a `width`×`height` grid.
///
/// `sample` receives in-range texel coordinates; neighbors past an edge wrap
/// around to the opposite side.
pub fn bilinear<T, F>(u: f32, v: f32, width: usize, height: usize, sample: F) -> T
where
    T: Lerp,
    F: Fn(usize, usize) -> T,
{
    let (left, x_fraction) = split_texel(u * width as f32);
    let (bottom, y_fraction) = split_texel(v * height as f32);

    let wrap_x = |x: i64| x.rem_euclid(width as i64) as usize;
    let wrap_y = |y: i64| y.rem_euclid(height as i64) as usize;
    let (x0, x1) = (wrap_x(left), wrap_x(left + 1));
    let (y0, y1) = (wrap_y(bottom), wrap_y(bottom + 1));

    let lower = sample(x0, y0).lerp(sample(x1, y0), x_fraction);
    let upper = sample(x0, y1).lerp(sample(x1, y1), x_fraction);
    lower.lerp(upper, y_fraction)
}
