//! Square N×N matrices using the column-vector convention.
//!
//! # Convention
//! - Vectors are **column vectors** on the right: `Mat4 * Vec`
//! - Translation is stored in the **last column**
//! - Transforms chain **right-to-left**: `A * B * v` applies B first, then A
//! - Projections are right-handed and OpenGL-style: the camera looks down
//!   -Z and NDC depth spans `[-1, 1]` with -1 at the near plane
//!
//! # Example
//! ```ignore
//! let transform = rotation * scale;  // scale applied first, then rotation
//! let result = transform * vertex;   // transform the vertex
//! ```

use std::ops::{Div, Mul};

use super::vec3::Vec3;
use super::vec4::Vec4;

/// N×N matrix stored as `data[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat<const N: usize> {
    data: [[f32; N]; N],
}

pub type Mat3 = Mat<3>;
pub type Mat4 = Mat<4>;

/// Target rectangle for [`Mat4::viewport`], in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: usize,
    pub height: usize,
}

impl<const N: usize> Mat<N> {
    pub const fn new(data: [[f32; N]; N]) -> Self {
        Self { data }
    }

    pub fn zero() -> Self {
        Self::new([[0.0; N]; N])
    }

    pub fn identity() -> Self {
        let mut m = Self::zero();
        for i in 0..N {
            m.data[i][i] = 1.0;
        }
        m
    }

    pub fn transpose(&self) -> Self {
        let mut m = Self::zero();
        for row in 0..N {
            for col in 0..N {
                m.data[col][row] = self.data[row][col];
            }
        }
        m
    }

    /// Determinant by cofactor expansion along the first row.
    pub fn determinant(&self) -> f32 {
        determinant_of(&self.flatten(), N)
    }

    /// Signed minor of element `(row, col)`.
    pub fn cofactor(&self, row: usize, col: usize) -> f32 {
        let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
        sign * determinant_of(&minor_of(&self.flatten(), N, row, col), N - 1)
    }

    /// Transpose of the cofactor matrix.
    pub fn adjugate(&self) -> Self {
        let mut m = Self::zero();
        for row in 0..N {
            for col in 0..N {
                m.data[col][row] = self.cofactor(row, col);
            }
        }
        m
    }

    /// Computes the inverse of the matrix, if it exists.
    ///
    /// Returns `None` if the matrix is singular. The determinant is judged
    /// against the product of the row lengths, its largest possible magnitude,
    /// so uniformly tiny or huge scales still invert.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        let row_lengths: f32 = self
            .data
            .iter()
            .map(|row| row.iter().map(|x| x * x).sum::<f32>().sqrt())
            .product();
        if !det.is_finite() || det.abs() <= f32::EPSILON * row_lengths {
            return None;
        }
        Some(self.adjugate() / det)
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row][col]
    }

    /// Set element at [row][col].
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row][col] = value;
    }

    fn flatten(&self) -> Vec<f32> {
        self.data.iter().flatten().copied().collect()
    }
}

fn minor_of(m: &[f32], n: usize, skip_row: usize, skip_col: usize) -> Vec<f32> {
    let mut minor = Vec::with_capacity((n - 1) * (n - 1));
    for row in (0..n).filter(|&r| r != skip_row) {
        for col in (0..n).filter(|&c| c != skip_col) {
            minor.push(m[row * n + col]);
        }
    }
    minor
}

fn determinant_of(m: &[f32], n: usize) -> f32 {
    match n {
        0 => 1.0,
        1 => m[0],
        2 => m[0] * m[3] - m[1] * m[2],
        _ => (0..n)
            .map(|col| {
                let sign = if col % 2 == 0 { 1.0 } else { -1.0 };
                sign * m[col] * determinant_of(&minor_of(m, n, 0, col), n - 1)
            })
            .sum(),
    }
}

impl<const N: usize> Default for Mat<N> {
    fn default() -> Self {
        Self::identity()
    }
}

/// Matrix multiplication.
///
/// `A * B * v` applies B first, then A.
impl<const N: usize> Mul<Mat<N>> for Mat<N> {
    type Output = Mat<N>;

    fn mul(self, rhs: Mat<N>) -> Self::Output {
        let mut result = Mat::zero();
        for row in 0..N {
            for col in 0..N {
                result.data[row][col] = (0..N).map(|k| self.data[row][k] * rhs.data[k][col]).sum();
            }
        }
        result
    }
}

impl<const N: usize> Mul<f32> for Mat<N> {
    type Output = Mat<N>;

    fn mul(mut self, rhs: f32) -> Self::Output {
        self.data.iter_mut().flatten().for_each(|e| *e *= rhs);
        self
    }
}

impl<const N: usize> Div<f32> for Mat<N> {
    type Output = Mat<N>;

    fn div(mut self, rhs: f32) -> Self::Output {
        self.data.iter_mut().flatten().for_each(|e| *e /= rhs);
        self
    }
}

impl Mat3 {
    /// Creates a rotation matrix around the X axis.
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3::new([[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]])
    }

    /// Creates a rotation matrix around the Y axis.
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3::new([[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]])
    }

    /// Creates a rotation matrix around the Z axis.
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3::new([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn scaling(x: f32, y: f32, z: f32) -> Self {
        Mat3::new([[x, 0.0, 0.0], [0.0, y, 0.0], [0.0, 0.0, z]])
    }

    /// Embeds this matrix in the upper-left corner of a 4×4 identity.
    pub fn expand_to_mat4(&self) -> Mat4 {
        let mut m = Mat4::identity();
        for row in 0..3 {
            for col in 0..3 {
                m.data[row][col] = self.data[row][col];
            }
        }
        m
    }
}

impl From<Mat3> for Mat4 {
    fn from(m: Mat3) -> Self {
        m.expand_to_mat4()
    }
}

impl Mat4 {
    /// Creates a translation matrix.
    ///
    /// Translation is stored in the last column (column-major convention).
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a scale matrix.
    pub fn scaling(x: f32, y: f32, z: f32) -> Self {
        Mat3::scaling(x, y, z).expand_to_mat4()
    }

    pub fn rotation_x(angle: f32) -> Self {
        Mat3::rotation_x(angle).expand_to_mat4()
    }

    pub fn rotation_y(angle: f32) -> Self {
        Mat3::rotation_y(angle).expand_to_mat4()
    }

    pub fn rotation_z(angle: f32) -> Self {
        Mat3::rotation_z(angle).expand_to_mat4()
    }

    /// Creates a right-handed perspective projection.
    ///
    /// `fov_y` is the vertical field of view in radians. Points on the near
    /// plane map to NDC z = -1, points on the far plane to z = 1, and clip
    /// space w equals the view-space distance in front of the camera.
    pub fn perspective_rh(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let a = (far + near) / (near - far);
        let b = 2.0 * far * near / (near - far);
        Mat4::new([
            [f / aspect_ratio, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, a, b],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Creates a right-handed orthographic projection mapping the given box
    /// to the `[-1, 1]` cube.
    pub fn orthographic_rh(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Mat4::new([
            [2.0 / (right - left), 0.0, 0.0, -(right + left) / (right - left)],
            [0.0, 2.0 / (top - bottom), 0.0, -(top + bottom) / (top - bottom)],
            [0.0, 0.0, -2.0 / (far - near), -(far + near) / (far - near)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a right-handed view matrix.
    ///
    /// # Arguments
    ///
    /// * `eye` - The position of the camera.
    /// * `target` - The point the camera is looking at.
    /// * `up` - The up direction of the camera.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        // The camera looks down its local -Z.
        let back = (eye - target).normalize();
        let right = up.cross(back).normalize();
        let up = back.cross(right);

        Self::new([
            [right.x, right.y, right.z, -right.dot(eye)],
            [up.x, up.y, up.z, -up.dot(eye)],
            [back.x, back.y, back.z, -back.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Maps NDC x/y in `[-1, 1]` onto the pixel rectangle of `viewport`.
    ///
    /// Depth passes through unchanged. NDC y = -1 lands on row `viewport.y`,
    /// so row 0 of the target is the bottom of the image.
    pub fn viewport(viewport: Viewport) -> Self {
        let half_width = viewport.width as f32 / 2.0;
        let half_height = viewport.height as f32 / 2.0;
        Mat4::new([
            [half_width, 0.0, 0.0, viewport.x + half_width],
            [0.0, half_height, 0.0, viewport.y + half_height],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Returns a new matrix with translation applied: `self * Mat4::translation(x, y, z)`.
    pub fn translate(&self, x: f32, y: f32, z: f32) -> Self {
        *self * Mat4::translation(x, y, z)
    }

    /// Transforms a point (w=1), applying the perspective divide.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        (*self * Vec4::from_vec3(point, 1.0)).to_vec3_perspective()
    }

    /// Transforms a direction (w=0); translation does not apply.
    pub fn transform_direction(&self, direction: Vec3) -> Vec3 {
        (*self * Vec4::from_vec3(direction, 0.0)).to_vec3()
    }
}

/// Transform a Vec3 by a 3×3 matrix.
impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    fn mul(self, v: Vec3) -> Self::Output {
        let d = &self.data;
        Vec3::new(
            d[0][0] * v.x + d[0][1] * v.y + d[0][2] * v.z,
            d[1][0] * v.x + d[1][1] * v.y + d[1][2] * v.z,
            d[2][0] * v.x + d[2][1] * v.y + d[2][2] * v.z,
        )
    }
}

/// Transform a Vec4 by a matrix: Mat4 * Vec4 (column vector).
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        let d = &self.data;
        Vec4::new(
            d[0][0] * v.x + d[0][1] * v.y + d[0][2] * v.z + d[0][3] * v.w,
            d[1][0] * v.x + d[1][1] * v.y + d[1][2] * v.z + d[1][3] * v.w,
            d[2][0] * v.x + d[2][1] * v.y + d[2][2] * v.z + d[2][3] * v.w,
            d[3][0] * v.x + d[3][1] * v.y + d[3][2] * v.z + d[3][3] * v.w,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn assert_mat_eq<const N: usize>(a: &Mat<N>, b: &Mat<N>) {
        for row in 0..N {
            for col in 0..N {
                assert_relative_eq!(a.get(row, col), b.get(row, col), epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn identity_is_multiplicative_neutral() {
        let m = Mat4::translation(1.0, 2.0, 3.0) * Mat4::rotation_y(0.3);
        assert_mat_eq(&(m * Mat4::identity()), &m);
        assert_mat_eq(&(Mat4::identity() * m), &m);
    }

    #[test]
    fn translation_moves_points_not_directions() {
        let m = Mat4::translation(1.0, 2.0, 3.0);
        assert_eq!(m.transform_point(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.transform_direction(Vec3::UP), Vec3::UP);
    }

    #[test]
    fn rotation_y_quarter_turn_maps_x_to_minus_z() {
        let v = Mat3::rotation_y(FRAC_PI_2) * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(v.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn determinant_of_scaling_is_product_of_factors() {
        assert_relative_eq!(Mat4::scaling(2.0, 3.0, 4.0).determinant(), 24.0);
        assert_relative_eq!(Mat3::scaling(2.0, 3.0, 0.5).determinant(), 3.0);
    }

    #[test]
    fn inverse_undoes_transform() {
        let m = Mat4::translation(1.0, -2.0, 3.0)
            * Mat4::rotation_x(0.4)
            * Mat4::rotation_z(-1.1)
            * Mat4::scaling(2.0, 0.5, 3.0);
        let inv = m.inverse().expect("matrix should be invertible");
        assert_mat_eq(&(m * inv), &Mat4::identity());
        assert_mat_eq(&(inv * m), &Mat4::identity());
    }

    #[test]
    fn inverse_of_singular_matrix_is_none() {
        assert!(Mat4::scaling(1.0, 0.0, 1.0).inverse().is_none());
        assert!(Mat3::zero().inverse().is_none());
    }

    #[test]
    fn small_uniform_scale_is_invertible() {
        let m = Mat4::scaling(0.004, 0.004, 0.004);
        let inv = m.inverse().expect("uniform scale should be invertible");
        assert_relative_eq!(inv.get(0, 0), 250.0, max_relative = 1e-4);
        assert_mat_eq(&(m * inv), &Mat4::identity());
        assert!(Mat3::scaling(0.004, 0.004, 0.0).inverse().is_none());
    }

    #[test]
    fn transpose_swaps_rows_and_columns() {
        let m = Mat4::translation(4.0, 5.0, 6.0).transpose();
        assert_eq!(m.get(3, 0), 4.0);
        assert_eq!(m.get(3, 2), 6.0);
        assert_eq!(m.get(0, 3), 0.0);
    }

    #[test]
    fn expand_keeps_upper_left_block() {
        let m = Mat3::rotation_z(0.7).expand_to_mat4();
        assert_eq!(m.get(3, 3), 1.0);
        assert_eq!(m.get(0, 3), 0.0);
        assert_relative_eq!(m.get(0, 0), 0.7f32.cos());
    }

    #[test]
    fn perspective_maps_near_and_far_planes_to_ndc_bounds() {
        let p = Mat4::perspective_rh(1.0, 1.0, 0.5, 10.0);
        let near = p.transform_point(Vec3::new(0.0, 0.0, -0.5));
        let far = p.transform_point(Vec3::new(0.0, 0.0, -10.0));
        assert_relative_eq!(near.z, -1.0, epsilon = 1e-5);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-5);
        let clip = p * Vec4::point(0.0, 0.0, -4.0);
        assert_relative_eq!(clip.w, 4.0);
    }

    #[test]
    fn orthographic_maps_box_to_unit_cube() {
        let o = Mat4::orthographic_rh(-1.0, 1.0, -2.0, 2.0, 0.2, 5.0);
        let corner = o.transform_point(Vec3::new(1.0, -2.0, -5.0));
        assert_relative_eq!(corner.x, 1.0);
        assert_relative_eq!(corner.y, -1.0);
        assert_relative_eq!(corner.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn look_at_places_target_on_negative_z() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::UP);
        let target = view.transform_point(Vec3::ZERO);
        assert_relative_eq!(target.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(target.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(target.z, -5.0, epsilon = 1e-6);
    }

    #[test]
    fn viewport_maps_ndc_corners_to_pixels() {
        let vp = Mat4::viewport(Viewport {
            x: 0.0,
            y: 0.0,
            width: 100,
            height: 50,
        });
        assert_eq!(vp.transform_point(Vec3::new(-1.0, -1.0, 0.3)), Vec3::new(0.0, 0.0, 0.3));
        assert_eq!(vp.transform_point(Vec3::new(1.0, 1.0, 0.3)), Vec3::new(100.0, 50.0, 0.3));
    }
}
