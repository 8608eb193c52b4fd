//! Triangles, vertices and barycentric coordinates.

use crate::aabb::{Aabb2, Aabb3};
use crate::math::{Vec2, Vec3, Vec4, W_EPSILON};

/// Edge-function magnitude at or below which a triangle is degenerate.
const DEGENERATE_AREA: f32 = 1e-2;

/// A mesh vertex.
///
/// `position` is homogeneous. Before the vertex stage it is a model-space
/// point (w = 1); after it, screen-space xyz with the clip-space w kept.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec4,
    pub color: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, color: Vec3, uv: Vec2, normal: Vec3) -> Self {
        Self {
            position: Vec4::from_vec3(position, 1.0),
            color,
            uv,
            normal,
        }
    }
}

/// Weights of a point relative to a triangle's three vertices.
///
/// Any negative weight marks the point as outside the triangle, or the
/// triangle as degenerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarycentricCoordinates {
    weights: [f32; 3],
}

impl BarycentricCoordinates {
    /// Returned for degenerate triangles; always fails [`are_degenerate`](Self::are_degenerate).
    pub const DEGENERATE: Self = Self {
        weights: [-1.0, 1.0, 1.0],
    };

    pub fn new(a: f32, b: f32, c: f32) -> Self {
        Self { weights: [a, b, c] }
    }

    pub fn weights(&self) -> [f32; 3] {
        self.weights
    }

    pub fn are_degenerate(&self) -> bool {
        self.weights.iter().any(|&w| w < 0.0)
    }

    /// Weighted sum `a * w0 + b * w1 + c * w2`.
    #[inline]
    pub fn weigh<T>(&self, a: T, b: T, c: T) -> T
    where
        T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
    {
        a * self.weights[0] + b * self.weights[1] + c * self.weights[2]
    }
}

impl std::ops::Index<usize> for BarycentricCoordinates {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.weights[index]
    }
}

/// Per-vertex data carried from the vertex stage to the fragment stage.
///
/// The rasterizer combines the three vertex values with the pixel's
/// barycentric weights; implement this for any payload a pass needs.
pub trait Attributes: Copy {
    fn interpolate(coords: &BarycentricCoordinates, a: &Self, b: &Self, c: &Self) -> Self;
}

impl Attributes for () {
    #[inline]
    fn interpolate(_: &BarycentricCoordinates, _: &Self, _: &Self, _: &Self) -> Self {}
}

macro_rules! impl_weighted_attributes {
    ($($ty:ty),*) => {
        $(
            impl Attributes for $ty {
                #[inline]
                fn interpolate(coords: &BarycentricCoordinates, a: &Self, b: &Self, c: &Self) -> Self {
                    coords.weigh(*a, *b, *c)
                }
            }
        )*
    };
}

impl_weighted_attributes!(f32, Vec2, Vec3, Vec4);

impl Attributes for Vertex {
    fn interpolate(coords: &BarycentricCoordinates, a: &Self, b: &Self, c: &Self) -> Self {
        Self {
            position: coords.weigh(a.position, b.position, c.position),
            color: coords.weigh(a.color, b.color, c.color),
            uv: coords.weigh(a.uv, b.uv, c.uv),
            normal: coords.weigh(a.normal, b.normal, c.normal),
        }
    }
}

/// Three vertices. Winding order decides which side faces the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(vertices: [Vertex; 3]) -> Self {
        Self { vertices }
    }

    fn positions(&self) -> [Vec3; 3] {
        self.vertices.map(|v| v.position.to_vec3())
    }

    /// Bounding box of the vertex positions' xyz.
    pub fn calculate_aabb(&self) -> Aabb3 {
        let [a, b, c] = self.positions();
        let mut aabb = Aabb3::new(a, a);
        for p in [b, c] {
            aabb = Aabb3::unite(&aabb, &Aabb3::new(p, p));
        }
        aabb
    }

    /// Bounding box of the vertex positions projected onto the xy plane.
    pub fn calculate_aabb2(&self) -> Aabb2 {
        let [a, b, c] = self.positions().map(|p| p.xy());
        let mut aabb = Aabb2::new(a, a);
        for p in [b, c] {
            aabb = Aabb2::unite(&aabb, &Aabb2::new(p, p));
        }
        aabb
    }

    /// Screen-space barycentric coordinates of `point`, perspective-corrected
    /// by the vertices' clip-space `vertex_ws`.
    ///
    /// Each weight is divided by its vertex's w (when w >= [`W_EPSILON`]) and
    /// the three are renormalized to sum to one (when the sum is at least
    /// [`W_EPSILON`]). A triangle whose xy area is at or below
    /// `DEGENERATE_AREA` yields [`BarycentricCoordinates::DEGENERATE`].
    pub fn barycentric_2d(&self, point: Vec2, vertex_ws: [f32; 3]) -> BarycentricCoordinates {
        let [p0, p1, p2] = self.positions();

        // Solve point = p0 + u*(p2 - p0) + v*(p1 - p0) via the cross product
        // of the x and y rows.
        let xs = Vec3::new(p2.x - p0.x, p1.x - p0.x, p0.x - point.x);
        let ys = Vec3::new(p2.y - p0.y, p1.y - p0.y, p0.y - point.y);
        let u = xs.cross(ys);

        if u.z.abs() <= DEGENERATE_AREA {
            return BarycentricCoordinates::DEGENERATE;
        }

        let mut weights = [1.0 - (u.x + u.y) / u.z, u.y / u.z, u.x / u.z];
        for (weight, w) in weights.iter_mut().zip(vertex_ws) {
            if w >= W_EPSILON {
                *weight /= w;
            }
        }

        let total: f32 = weights.iter().sum();
        if total >= W_EPSILON {
            weights.iter_mut().for_each(|weight| *weight /= total);
        }

        BarycentricCoordinates { weights }
    }

    /// Unit normal of the plane through the three positions.
    ///
    /// Counter-clockwise vertices (seen from +z looking down -z) produce a
    /// normal with positive z.
    pub fn face_normal(&self) -> Vec3 {
        let [p0, p1, p2] = self.positions();
        (p1 - p0).cross(p2 - p0).normalize()
    }

    /// True when the face normal points away from the viewer along +z.
    ///
    /// Degenerate triangles have a NaN normal and are not reported as
    /// back-facing; the barycentric test rejects them instead.
    pub fn is_backfacing(&self) -> bool {
        self.face_normal().dot(Vec3::FORWARD) < 0.0
    }
}
