//! Model transform.
//!
//! Provides a [`Transform`] struct with a fluent API for managing position,
//! rotation (Euler angles), and scale. The pipeline rebuilds it every frame
//! to spin the model about Y.

use crate::math::{Mat4, Vec3};

/// A 3D transform with position, rotation (Euler angles), and scale.
///
/// Provides a fluent API where mutating methods return `&mut Self` for chaining:
///
/// ```ignore
/// transform
///     .set_position_xyz(5.0, 2.0, 0.0)
///     .rotate_y(0.1)
///     .set_scale_uniform(2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3, // Euler angles in radians: x=pitch, y=yaw, z=roll
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self
    }

    pub fn set_position_xyz(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.position += delta;
        self
    }

    /// Get the rotation (Euler angles in radians).
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) -> &mut Self {
        self.rotation = rotation;
        self
    }

    /// Rotate around the Y axis (yaw).
    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        self.rotation.y += angle;
        self
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale_uniform(&mut self, s: f32) -> &mut Self {
        self.scale = Vec3::splat(s);
        self
    }

    /// Generate the transformation matrix.
    ///
    /// Order: Translation * RotationX * RotationY * RotationZ * Scale
    /// (Scale applied first, then rotations, then translation)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::translation(self.position.x, self.position.y, self.position.z)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::scaling(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Matrix for transforming normals: the inverse transpose of
    /// [`to_matrix`](Self::to_matrix).
    ///
    /// Falls back to the model matrix itself when it is singular (zero scale).
    pub fn normal_matrix(&self) -> Mat4 {
        let model = self.to_matrix();
        model.inverse().map_or(model, |inverse| inverse.transpose())
    }
}
