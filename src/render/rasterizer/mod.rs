//! Triangle rasterization with programmable shaders.
//!
//! The [`Rasterizer`] owns uploaded models and draws them into any
//! [`FrameBuffer`] through a [`DrawConfig`]. Per triangle it:
//!
//! 1. runs the vertex shader on each vertex, applies the viewport transform
//!    and the perspective divide (keeping each vertex's clip-space w),
//! 2. culls triangles facing away from +z,
//! 3. clips the triangle's screen bounding box into the target,
//! 4. computes perspective-corrected barycentric coordinates for every pixel
//!    in the box and skips those outside the triangle,
//! 5. depth-tests against the optional depth buffer (nearer = smaller z),
//! 6. interpolates the vertex and attributes and writes the fragment
//!    shader's result.
//!
//! Triangles are drawn in model order; a later triangle wins ties only when
//! no depth buffer is attached.

pub mod shader;

use std::collections::HashMap;

use log::{debug, trace};

use super::framebuffer::FrameBuffer;
use crate::math::{Mat4, Vec2, Vec4, Viewport};
use crate::model::Model;
use crate::triangle::{Attributes, Triangle, Vertex};
use shader::{FragmentShader, VertexOutput, VertexShader};

/// Opaque key for a model uploaded to a [`Rasterizer`].
///
/// Handles increase monotonically per rasterizer and are never reused, even
/// after [`Rasterizer::delete_model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelHandle(u64);

impl ModelHandle {
    /// Raw numeric value, for logging.
    pub fn id(self) -> u64 {
        self.0
    }
}

impl From<u64> for ModelHandle {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Everything one [`Rasterizer::draw_triangles`] call writes to and runs.
pub struct DrawConfig<'a, T, V, F> {
    pub target: &'a mut FrameBuffer<T>,
    /// When attached, a fragment is kept only if its z is smaller than the
    /// stored value, which it then replaces.
    pub depth_buffer: Option<&'a mut FrameBuffer<f32>>,
    pub vertex_shader: V,
    pub fragment_shader: F,
}

impl<'a, T, V, F> DrawConfig<'a, T, V, F> {
    pub fn new(target: &'a mut FrameBuffer<T>, vertex_shader: V, fragment_shader: F) -> Self {
        Self {
            target,
            depth_buffer: None,
            vertex_shader,
            fragment_shader,
        }
    }

    pub fn with_depth_buffer(mut self, depth_buffer: &'a mut FrameBuffer<f32>) -> Self {
        self.depth_buffer = Some(depth_buffer);
        self
    }
}

/// Registry of uploaded models plus the triangle pipeline that draws them.
#[derive(Debug, Default)]
pub struct Rasterizer {
    models: HashMap<ModelHandle, Model>,
    last_handle: u64,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `model` and returns a fresh handle for it.
    pub fn upload_model(&mut self, model: Model) -> ModelHandle {
        self.last_handle += 1;
        let handle = ModelHandle(self.last_handle);
        debug!(
            "Uploaded model {} with {} triangles",
            handle.id(),
            model.triangles().len()
        );
        self.models.insert(handle, model);
        handle
    }

    /// Removes a model, returning it if it was present. The handle stays retired.
    pub fn delete_model(&mut self, handle: ModelHandle) -> Option<Model> {
        let removed = self.models.remove(&handle);
        if removed.is_some() {
            debug!("Deleted model {}", handle.id());
        }
        removed
    }

    pub fn model(&self, handle: ModelHandle) -> Option<&Model> {
        self.models.get(&handle)
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Draws every triangle of the model behind `handle`.
    ///
    /// An unknown handle draws nothing.
    pub fn draw_triangles<T, V, F>(&self, handle: ModelHandle, draw: &mut DrawConfig<'_, T, V, F>)
    where
        T: Copy,
        V: VertexShader,
        F: FragmentShader<V::Attributes, Output = T>,
    {
        let Some(model) = self.models.get(&handle) else {
            debug!("draw_triangles: no model for handle {}", handle.id());
            return;
        };

        let viewport = Mat4::viewport(Viewport {
            x: 0.0,
            y: 0.0,
            width: draw.target.width(),
            height: draw.target.height(),
        });

        for triangle in model.triangles() {
            draw_triangle(triangle, &viewport, draw);
        }
    }
}

fn draw_triangle<T, V, F>(triangle: &Triangle, viewport: &Mat4, draw: &mut DrawConfig<'_, T, V, F>)
where
    T: Copy,
    V: VertexShader,
    F: FragmentShader<V::Attributes, Output = T>,
{
    // ─────────────────────────────────────────────────────────────────────
    // Vertex stage
    // ─────────────────────────────────────────────────────────────────────
    let outputs: [VertexOutput<V::Attributes>; 3] =
        triangle.vertices.map(|vertex| draw.vertex_shader.shade(vertex));

    let mut screen = Triangle::new(outputs.map(|out| out.vertex));
    let mut vertex_ws = [0.0f32; 3];
    for (vertex, w) in screen.vertices.iter_mut().zip(vertex_ws.iter_mut()) {
        let clip = *viewport * vertex.position;
        *w = clip.w;
        vertex.position = Vec4::from_vec3(clip.to_vec3_perspective(), clip.w);
    }
    let attributes = outputs.map(|out| out.attributes);

    // ─────────────────────────────────────────────────────────────────────
    // Culling and bounds
    // ─────────────────────────────────────────────────────────────────────
    if screen.is_backfacing() {
        return;
    }

    let mut image_bounds = draw.target.bounds();
    image_bounds.max.x -= 1.0;
    image_bounds.max.y -= 1.0;
    let bounds = screen.calculate_aabb2().bound_into(&image_bounds);
    if !bounds.has_area() {
        trace!("Triangle outside the target, skipped");
        return;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scan the clipped box (inclusive)
    // ─────────────────────────────────────────────────────────────────────
    let (min_x, max_x) = (bounds.min.x as usize, bounds.max.x as usize);
    let (min_y, max_y) = (bounds.min.y as usize, bounds.max.y as usize);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let coords = screen.barycentric_2d(Vec2::new(x as f32, y as f32), vertex_ws);
            if coords.are_degenerate() {
                continue;
            }

            if let Some(depth_buffer) = draw.depth_buffer.as_deref_mut() {
                let [p0, p1, p2] = screen.vertices.map(|v| v.position.z);
                let z = coords.weigh(p0, p1, p2);
                let stored = depth_buffer.at_texel_mut(x, y);
                if z >= *stored {
                    continue;
                }
                *stored = z;
            }

            let [v0, v1, v2] = &screen.vertices;
            let vertex = Vertex::interpolate(&coords, v0, v1, v2);
            let [a0, a1, a2] = &attributes;
            let interpolated = V::Attributes::interpolate(&coords, a0, a1, a2);

            *draw.target.at_texel_mut(x, y) = draw.fragment_shader.shade(&vertex, &interpolated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::shader::{Depth, Flat, PassThrough, VertexColor};
    use super::*;
    use crate::math::Vec3;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    const SIZE: usize = 100;
    const CLEAR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
    const RED: Vec3 = Vec3::new(1.0, 0.0, 0.0);

    /// Vertex whose clip-space position lands on pixel `(x, y)` of a
    /// `SIZE`×`SIZE` target at depth `z`.
    fn pixel_vertex(x: f32, y: f32, z: f32, color: Vec3) -> Vertex {
        let ndc = |p: f32| p / SIZE as f32 * 2.0 - 1.0;
        Vertex {
            position: Vec4::point(ndc(x), ndc(y), z),
            color,
            ..Vertex::default()
        }
    }

    fn pixel_triangle(points: [(f32, f32); 3], z: f32, color: Vec3) -> Triangle {
        Triangle::new(points.map(|(x, y)| pixel_vertex(x, y, z, color)))
    }

    fn single_triangle_model(points: [(f32, f32); 3], color: Vec3) -> Model {
        Model::new(vec![pixel_triangle(points, 0.0, color)])
    }

    fn assert_color(actual: Vec4, expected: Vec4) {
        assert!(
            (actual - expected).length() < 1e-5,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn color_target() -> FrameBuffer<Vec4> {
        FrameBuffer::new(SIZE, SIZE, CLEAR)
    }

    #[test]
    fn solid_triangle_fills_its_footprint() {
        let mut rasterizer = Rasterizer::new();
        let handle =
            rasterizer.upload_model(single_triangle_model([(10.0, 10.0), (50.0, 10.0), (10.0, 50.0)], RED));
        let mut target = color_target();

        rasterizer.draw_triangles(
            handle,
            &mut DrawConfig::new(&mut target, PassThrough, VertexColor),
        );

        let red = Vec4::from_vec3(RED, 1.0);
        for y in 11..49 {
            for x in 11..49 {
                if x + y < 59 {
                    assert_color(target.at_texel(x, y), red);
                }
            }
        }
        assert_eq!(target.at_texel(0, 0), CLEAR);
        assert_eq!(target.at_texel(99, 99), CLEAR);
        assert_eq!(target.at_texel(45, 45), CLEAR);
    }

    #[test]
    fn backfacing_triangle_is_culled() {
        let mut rasterizer = Rasterizer::new();
        let handle =
            rasterizer.upload_model(single_triangle_model([(10.0, 10.0), (10.0, 50.0), (50.0, 10.0)], RED));
        let mut target = color_target();

        rasterizer.draw_triangles(
            handle,
            &mut DrawConfig::new(&mut target, PassThrough, VertexColor),
        );

        assert!(target.as_slice().iter().all(|&c| c == CLEAR));
    }

    #[test]
    fn unknown_handle_draws_nothing() {
        let mut rasterizer = Rasterizer::new();
        let uploaded =
            rasterizer.upload_model(single_triangle_model([(10.0, 10.0), (50.0, 10.0), (10.0, 50.0)], RED));
        let mut target = color_target();

        for handle in [ModelHandle::from(0), ModelHandle::from(uploaded.id() + 1)] {
            rasterizer.draw_triangles(
                handle,
                &mut DrawConfig::new(&mut target, PassThrough, VertexColor),
            );
        }

        assert!(target.as_slice().iter().all(|&c| c == CLEAR));
    }

    #[test]
    fn handles_are_unique_and_never_reused() {
        let mut rasterizer = Rasterizer::new();
        let first = rasterizer.upload_model(Model::default());
        let second = rasterizer.upload_model(Model::default());
        assert_ne!(first, second);

        assert!(rasterizer.delete_model(second).is_some());
        assert!(rasterizer.delete_model(second).is_none());
        let third = rasterizer.upload_model(Model::default());
        assert!(third > second);
        assert_eq!(rasterizer.model_count(), 2);
    }

    #[test]
    fn deleted_model_is_no_longer_drawn() {
        let mut rasterizer = Rasterizer::new();
        let handle =
            rasterizer.upload_model(single_triangle_model([(10.0, 10.0), (50.0, 10.0), (10.0, 50.0)], RED));
        rasterizer.delete_model(handle);
        let mut target = color_target();

        rasterizer.draw_triangles(
            handle,
            &mut DrawConfig::new(&mut target, PassThrough, VertexColor),
        );

        assert!(target.as_slice().iter().all(|&c| c == CLEAR));
    }

    #[test]
    fn offscreen_triangle_is_skipped() {
        let mut rasterizer = Rasterizer::new();
        let handle = rasterizer
            .upload_model(single_triangle_model([(150.0, 10.0), (190.0, 10.0), (150.0, 50.0)], RED));
        let mut target = color_target();

        rasterizer.draw_triangles(
            handle,
            &mut DrawConfig::new(&mut target, PassThrough, VertexColor),
        );

        assert!(target.as_slice().iter().all(|&c| c == CLEAR));
    }

    #[test]
    fn partially_offscreen_triangle_is_clipped() {
        let mut rasterizer = Rasterizer::new();
        let handle = rasterizer
            .upload_model(single_triangle_model([(-50.0, -50.0), (150.0, -50.0), (-50.0, 150.0)], RED));
        let mut target = color_target();

        rasterizer.draw_triangles(
            handle,
            &mut DrawConfig::new(&mut target, PassThrough, VertexColor),
        );

        assert_color(target.at_texel(0, 0), Vec4::from_vec3(RED, 1.0));
        assert_eq!(target.at_texel(99, 99), CLEAR);
    }

    #[test]
    fn nearer_triangle_wins_depth_test_regardless_of_order() {
        let points = [(10.0, 10.0), (60.0, 10.0), (10.0, 60.0)];
        let near = pixel_triangle(points, -0.5, Vec3::new(0.0, 1.0, 0.0));
        let far = pixel_triangle(points, 0.5, RED);

        for order in [vec![near, far], vec![far, near]] {
            let mut rasterizer = Rasterizer::new();
            let handle = rasterizer.upload_model(Model::new(order));
            let mut target = color_target();
            let mut depth = FrameBuffer::new(SIZE, SIZE, f32::MAX);

            rasterizer.draw_triangles(
                handle,
                &mut DrawConfig::new(&mut target, PassThrough, VertexColor).with_depth_buffer(&mut depth),
            );

            assert_color(target.at_texel(20, 20), Vec4::new(0.0, 1.0, 0.0, 1.0));
            assert_relative_eq!(depth.at_texel(20, 20), -0.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn redrawing_with_depth_buffer_is_idempotent() {
        let mut rasterizer = Rasterizer::new();
        let handle =
            rasterizer.upload_model(single_triangle_model([(10.0, 10.0), (80.0, 20.0), (30.0, 90.0)], RED));
        let mut target = color_target();
        let mut depth = FrameBuffer::new(SIZE, SIZE, f32::MAX);
        let writes = Cell::new(0usize);

        let count_writes = |v: &Vertex, _: &()| {
            writes.set(writes.get() + 1);
            Vec4::from_vec3(v.color, 1.0)
        };
        let mut draw = DrawConfig::new(&mut target, PassThrough, count_writes).with_depth_buffer(&mut depth);
        rasterizer.draw_triangles(handle, &mut draw);
        let first_pass = writes.replace(0);
        rasterizer.draw_triangles(handle, &mut draw);
        drop(draw);

        assert!(first_pass > 0);
        assert_eq!(writes.get(), 0);
        assert_color(target.at_texel(30, 30), Vec4::from_vec3(RED, 1.0));
    }

    #[test]
    fn attributes_flow_from_vertex_to_fragment_stage() {
        let mut rasterizer = Rasterizer::new();
        let handle =
            rasterizer.upload_model(single_triangle_model([(0.0, 0.0), (99.0, 0.0), (0.0, 99.0)], RED));
        let mut target = FrameBuffer::new(SIZE, SIZE, -1.0f32);

        // Each vertex reports its clip-space x as an attribute.
        let vertex_shader = |v: Vertex| VertexOutput::new(v, v.position.x);
        let fragment_shader = |_: &Vertex, x: &f32| *x;
        rasterizer.draw_triangles(
            handle,
            &mut DrawConfig::new(&mut target, vertex_shader, fragment_shader),
        );

        // Attribute varies linearly with the pixel's x.
        let left = target.at_texel(1, 10);
        let right = target.at_texel(60, 10);
        assert!(left < right);
        assert!((right - (60.0 / 50.0 - 1.0)).abs() < 1e-3);
    }

    #[test]
    fn depth_shader_writes_fragment_depth() {
        let mut rasterizer = Rasterizer::new();
        let handle = rasterizer.upload_model(Model::new(vec![pixel_triangle(
            [(10.0, 10.0), (50.0, 10.0), (10.0, 50.0)],
            0.25,
            RED,
        )]));
        let mut target = FrameBuffer::new(SIZE, SIZE, 1.0f32);

        rasterizer.draw_triangles(handle, &mut DrawConfig::new(&mut target, PassThrough, Depth));

        assert_relative_eq!(target.at_texel(20, 20), 0.25, epsilon = 1e-5);
        assert_eq!(target.at_texel(90, 90), 1.0);
    }

    #[test]
    fn flat_shader_fills_any_texel_type() {
        let mut rasterizer = Rasterizer::new();
        let handle =
            rasterizer.upload_model(single_triangle_model([(10.0, 10.0), (50.0, 10.0), (10.0, 50.0)], RED));
        let mut target = FrameBuffer::new(SIZE, SIZE, 0u8);

        rasterizer.draw_triangles(handle, &mut DrawConfig::new(&mut target, PassThrough, Flat(255u8)));

        assert_eq!(target.at_texel(15, 15), 255);
        assert_eq!(target.at_texel(5, 5), 0);
    }

    #[test]
    fn byte_texel_target_is_drawable() {
        let mut rasterizer = Rasterizer::new();
        let handle =
            rasterizer.upload_model(single_triangle_model([(10.0, 10.0), (50.0, 10.0), (10.0, 50.0)], RED));
        let mut target = FrameBuffer::new(SIZE, SIZE, [0u8; 4]);
        let mut depth = FrameBuffer::new(SIZE, SIZE, f32::MAX);

        let mut draw = DrawConfig::new(&mut target, PassThrough, Flat([255u8, 0, 0, 255]))
            .with_depth_buffer(&mut depth);
        rasterizer.draw_triangles(handle, &mut draw);

        assert_eq!(target.at_texel(15, 15), [255, 0, 0, 255]);
        assert_eq!(target.at_texel(90, 90), [0; 4]);
    }
}
