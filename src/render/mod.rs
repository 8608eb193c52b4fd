//! Render targets, texture sampling and the triangle rasterizer.

pub mod framebuffer;
pub mod rasterizer;
pub mod sampling;

pub use framebuffer::FrameBuffer;
pub use rasterizer::shader;
pub use rasterizer::shader::{
    Depth, Flat, FragmentShader, PassThrough, VertexColor, VertexOutput, VertexShader,
};
pub use rasterizer::{DrawConfig, ModelHandle, Rasterizer};
pub use sampling::SamplerMode;
