//! A CPU-only triangle rasterizer with programmable shaders.
//!
//! Models are uploaded once to a [`Rasterizer`] and drawn into any
//! [`FrameBuffer`] through user-supplied vertex and fragment shaders. The
//! [`Pipeline`] composes two such draws per frame: a shadow-map pass from a
//! directional light and a textured, lit color pass. SDL2 is used only to
//! show the result (feature `window`).
//!
//! # Quick Start
//!
//! ```ignore
//! use softshade::prelude::*;
//!
//! let mut rasterizer = Rasterizer::new();
//! let cube = rasterizer.upload_model(Model::cube(0.5));
//!
//! let mut target = FrameBuffer::new(320, 240, Vec4::ZERO);
//! let mut depth = FrameBuffer::new(320, 240, f32::MAX);
//! let mvp = Mat4::perspective_rh(1.0, 4.0 / 3.0, 0.1, 100.0) * Mat4::translation(0.0, 0.0, -3.0);
//!
//! let vertex_shader = |mut v: Vertex| {
//!     v.position = mvp * v.position;
//!     VertexOutput::new(v, ())
//! };
//! let mut draw = DrawConfig::new(&mut target, vertex_shader, VertexColor).with_depth_buffer(&mut depth);
//! rasterizer.draw_triangles(cube, &mut draw);
//! ```

// Public API - exposed to library consumers
pub mod aabb;
pub mod bitmap;
pub mod colors;
pub mod config;
pub mod error;
pub mod input;
pub mod light;
pub mod math;
pub mod model;
pub mod pipeline;
pub mod projection;
pub mod render;
pub mod texture;
pub mod transform;
pub mod triangle;
#[cfg(feature = "window")]
pub mod window;

// Re-export commonly needed types at crate root for convenience
pub use config::Config;
pub use error::{ConfigError, Error, LoadError, Result};
pub use model::Model;
pub use pipeline::Pipeline;
pub use render::{DrawConfig, FrameBuffer, ModelHandle, Rasterizer, SamplerMode};
pub use triangle::{Triangle, Vertex};

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use softshade::prelude::*;
/// ```
pub mod prelude {
    // Math
    pub use crate::math::{Lerp, Mat3, Mat4, Vec2, Vec3, Vec4};

    // Geometry
    pub use crate::model::Model;
    pub use crate::triangle::{Attributes, BarycentricCoordinates, Triangle, Vertex};

    // Rendering
    pub use crate::render::shader::{
        Depth, Flat, FragmentShader, PassThrough, VertexColor, VertexOutput, VertexShader,
    };
    pub use crate::render::{DrawConfig, FrameBuffer, ModelHandle, Rasterizer, SamplerMode};
    pub use crate::texture::Texture;

    // Scene
    pub use crate::light::DirectionalLight;
    pub use crate::pipeline::Pipeline;
    pub use crate::projection::{Orthographic, Perspective};
    pub use crate::transform::Transform;

    // Input
    pub use crate::input::{Input, KeyCode, KeyState};

    // Window
    #[cfg(feature = "window")]
    pub use crate::window::{FrameLimiter, Window, WindowEvent};
}
