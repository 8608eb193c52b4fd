//! Programmable vertex and fragment stages.
//!
//! This module provides a trait-based abstraction for per-vertex and
//! per-pixel computations, similar to how GPUs separate the fixed-function
//! rasterizer from programmable shaders.
//!
//! # Architecture
//!
//! The rasterizer handles:
//! - Viewport transform and perspective divide
//! - Backface culling
//! - Bounding box computation
//! - Barycentric coordinate calculation and depth testing
//!
//! The shaders handle:
//! - Transforming model-space vertices into clip space
//! - Producing per-vertex [`Attributes`] for the pass
//! - Texture sampling, lighting and the final texel value
//!
//! Closures work as shaders directly:
//!
//! ```ignore
//! let vertex_shader = |v: Vertex| VertexOutput::new(Vertex { position: mvp * v.position, ..v }, ());
//! let fragment_shader = |v: &Vertex, _: &()| v.color;
//! ```

use crate::colors;
use crate::math::{Vec3, Vec4};
use crate::triangle::{Attributes, Vertex};

/// What the vertex stage hands to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput<A> {
    /// Vertex with a clip-space `position`.
    pub vertex: Vertex,
    pub attributes: A,
}

impl<A> VertexOutput<A> {
    pub fn new(vertex: Vertex, attributes: A) -> Self {
        Self { vertex, attributes }
    }
}

impl From<Vertex> for VertexOutput<()> {
    fn from(vertex: Vertex) -> Self {
        Self::new(vertex, ())
    }
}

/// Per-vertex stage, called three times per triangle.
pub trait VertexShader {
    type Attributes: Attributes;

    fn shade(&mut self, vertex: Vertex) -> VertexOutput<Self::Attributes>;
}

/// Per-pixel stage, called for every pixel that passes the depth test.
///
/// `vertex` and `attributes` are the barycentric blend of the three vertex
/// stage outputs at that pixel.
pub trait FragmentShader<A> {
    type Output;

    fn shade(&mut self, vertex: &Vertex, attributes: &A) -> Self::Output;
}

impl<F, A> VertexShader for F
where
    F: FnMut(Vertex) -> VertexOutput<A>,
    A: Attributes,
{
    type Attributes = A;

    #[inline]
    fn shade(&mut self, vertex: Vertex) -> VertexOutput<A> {
        self(vertex)
    }
}

impl<F, A, T> FragmentShader<A> for F
where
    F: FnMut(&Vertex, &A) -> T,
{
    type Output = T;

    #[inline]
    fn shade(&mut self, vertex: &Vertex, attributes: &A) -> T {
        self(vertex, attributes)
    }
}

/// Vertex shader that treats positions as already in clip space.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl VertexShader for PassThrough {
    type Attributes = ();

    #[inline]
    fn shade(&mut self, vertex: Vertex) -> VertexOutput<()> {
        vertex.into()
    }
}

/// Fragment shader that writes the interpolated vertex color as opaque RGBA.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexColor;

impl<A> FragmentShader<A> for VertexColor {
    type Output = Vec4;

    #[inline]
    fn shade(&mut self, vertex: &Vertex, _attributes: &A) -> Vec4 {
        colors::opaque(vertex.color)
    }
}

/// Fragment shader that writes one constant value.
#[derive(Debug, Clone, Copy)]
pub struct Flat<T>(pub T);

impl<A, T: Copy> FragmentShader<A> for Flat<T> {
    type Output = T;

    #[inline]
    fn shade(&mut self, _vertex: &Vertex, _attributes: &A) -> T {
        self.0
    }
}

/// Fragment shader that writes the fragment's depth (screen-space z).
#[derive(Debug, Clone, Copy, Default)]
pub struct Depth;

impl<A> FragmentShader<A> for Depth {
    type Output = f32;

    #[inline]
    fn shade(&mut self, vertex: &Vertex, _attributes: &A) -> f32 {
        vertex.position.z
    }
}

/// Lambert factor `max(n · l, 0)` for a surface normal and a direction
/// pointing toward the light.
#[inline]
pub fn lambert(normal: Vec3, to_light: Vec3) -> f32 {
    normal.normalize().dot(to_light).max(0.0)
}
