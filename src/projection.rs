//! Projection parameters.
//!
//! [`Perspective`] drives the camera in the color pass and [`Orthographic`]
//! the directional light in the shadow pass. Both produce right-handed
//! matrices that map their view volume onto NDC `[-1, 1]` on every axis.

use crate::math::Mat4;

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    /// Vertical field of view in radians.
    fov_y: f32,
    /// Aspect ratio (width / height).
    aspect_ratio: f32,
    /// Near clipping plane distance.
    z_near: f32,
    /// Far clipping plane distance.
    z_far: f32,
}

impl Perspective {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect_ratio` - Width divided by height
    /// * `z_near` - Near clipping plane distance (must be > 0)
    /// * `z_far` - Far clipping plane distance (must be > z_near)
    pub fn new(fov_y: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y,
            aspect_ratio,
            z_near,
            z_far,
        }
    }

    /// Creates a projection from degrees instead of radians.
    pub fn from_degrees(fov_y_degrees: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self::new(fov_y_degrees.to_radians(), aspect_ratio, z_near, z_far)
    }

    /// Returns the vertical field of view in radians.
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Returns the horizontal field of view in radians.
    ///
    /// Computed from the vertical FOV and aspect ratio.
    pub fn fov_x(&self) -> f32 {
        2.0 * (self.aspect_ratio * (self.fov_y / 2.0).tan()).atan()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    /// Updates the aspect ratio (typically called on window resize).
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.z_near, self.z_far)
    }
}

/// Axis-aligned view-space box for an orthographic projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orthographic {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Orthographic {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}
