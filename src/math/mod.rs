//! Linear algebra primitives.
//!
//! All types are plain `Copy` values. Matrices use the column-vector
//! convention (`M * v`), see [`matrix`].

pub mod matrix;
pub mod vec2;
pub mod vec3;
pub mod vec4;

pub use matrix::{Mat, Mat3, Mat4, Viewport};
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;

/// Magnitude below which a homogeneous `w` is treated as zero.
///
/// Shared by the perspective divide and the barycentric perspective
/// correction so both stages agree on which vertices are "already
/// normalized".
pub const W_EPSILON: f32 = 1e-4;

/// Types that can be linearly interpolated.
///
/// Used by bilinear texture sampling, so every texel type a
/// [`FrameBuffer`](crate::render::FrameBuffer) is sampled with must implement it.
pub trait Lerp: Copy {
    fn lerp(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        self * (1.0 - t) + other * t
    }
}

impl Lerp for Vec2 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        Vec2::lerp(self, other, t)
    }
}

impl Lerp for Vec3 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        Vec3::lerp(self, other, t)
    }
}

impl Lerp for Vec4 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        Vec4::lerp(self, other, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_are_exact() {
        assert_eq!(Lerp::lerp(0.25f32, 0.75, 0.0), 0.25);
        assert_eq!(Lerp::lerp(0.25f32, 0.75, 1.0), 0.75);
        assert_eq!(
            Lerp::lerp(Vec3::ZERO, Vec3::ONE, 0.5),
            Vec3::splat(0.5)
        );
    }
}
