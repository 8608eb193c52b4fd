//! Lighting types for the renderer.

use crate::math::{Mat4, Vec3};
use crate::projection::Orthographic;
use crate::render::shader::lambert;

/// A directional light that illuminates the scene uniformly from a direction.
///
/// Directional lights are ideal for simulating distant light sources like the sun,
/// where all rays are effectively parallel. The shadow pass renders the scene
/// from a point `shadow_distance` back along the rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// The normalized direction the light is pointing (not where it comes from).
    pub direction: Vec3,
    pub ambient_intensity: f32,
    /// Multiplier for the diffuse lighting contribution (default: 1.0)
    pub diffuse_strength: f32,
    /// Distance from the origin to the shadow pass eye.
    pub shadow_distance: f32,
    /// Volume covered by the shadow map, in light view space.
    pub shadow_volume: Orthographic,
}

impl DirectionalLight {
    /// Create a new directional light pointing in the given direction.
    /// The direction will be normalized automatically.
    pub fn new(direction: Vec3) -> Self {
        DirectionalLight {
            direction: direction.normalize(),
            ambient_intensity: 0.1,
            diffuse_strength: 1.0,
            shadow_distance: 2.0,
            shadow_volume: Orthographic::new(-1.0, 1.0, -1.0, 1.0, 0.2, 5.0),
        }
    }

    /// Diffuse (Lambert) term in [0.0, 1.0] for a surface normal.
    pub fn intensity(&self, normal: Vec3) -> f32 {
        // Negate direction: light pointing at surface = positive dot product
        lambert(normal, -self.direction) * self.diffuse_strength
    }

    /// Ambient plus diffuse, unclamped.
    pub fn illumination(&self, normal: Vec3) -> f32 {
        self.ambient_intensity + self.intensity(normal)
    }

    /// View matrix of the shadow pass: looks along `direction` at the origin.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.direction * -self.shadow_distance, Vec3::ZERO, Vec3::UP)
    }

    pub fn projection(&self) -> Mat4 {
        self.shadow_volume.matrix()
    }

    /// `projection * view`, mapping world space to light clip space.
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}
