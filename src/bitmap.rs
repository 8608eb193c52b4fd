//! Uncompressed BMP snapshots of render targets.
//!
//! Buffers store row 0 at the bottom; image rows are written top first, so
//! every writer walks [`FrameBuffer::rows_top_down`].

use std::path::Path;

use image::error::{ParameterError, ParameterErrorKind};
use image::{GrayImage, ImageBuffer, ImageError, ImageFormat, ImageResult, Pixel, RgbImage};
use log::info;

use crate::colors;
use crate::math::Vec4;
use crate::render::FrameBuffer;

/// Converts a color target to an RGB image, dropping alpha.
pub fn color_image(buffer: &FrameBuffer<Vec4>) -> ImageResult<RgbImage> {
    let bytes = buffer
        .rows_top_down()
        .flatten()
        .flat_map(|&texel| colors::to_rgb8(texel))
        .collect();
    image_from_bytes(buffer.width(), buffer.height(), bytes)
}

/// Converts a single-channel target to grayscale (`255.9 × value`, clamped).
pub fn gray_image(buffer: &FrameBuffer<f32>) -> ImageResult<GrayImage> {
    let bytes = buffer
        .rows_top_down()
        .flatten()
        .map(|&value| colors::to_gray8(value))
        .collect();
    image_from_bytes(buffer.width(), buffer.height(), bytes)
}

/// Wraps converted bytes, failing when they don't fill `width`×`height`.
fn image_from_bytes<P>(width: usize, height: usize, bytes: Vec<u8>) -> ImageResult<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    let mismatch = || ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::DimensionMismatch));
    let width = u32::try_from(width).map_err(|_| mismatch())?;
    let height = u32::try_from(height).map_err(|_| mismatch())?;
    let expected = width as usize * height as usize * usize::from(P::CHANNEL_COUNT);
    if bytes.len() != expected {
        return Err(mismatch());
    }
    ImageBuffer::from_raw(width, height, bytes).ok_or_else(mismatch)
}

pub fn write_color<P: AsRef<Path>>(buffer: &FrameBuffer<Vec4>, path: P) -> ImageResult<()> {
    let path = path.as_ref();
    color_image(buffer)?.save_with_format(path, ImageFormat::Bmp)?;
    info!("Wrote {}", path.display());
    Ok(())
}

pub fn write_gray<P: AsRef<Path>>(buffer: &FrameBuffer<f32>, path: P) -> ImageResult<()> {
    let path = path.as_ref();
    gray_image(buffer)?.save_with_format(path, ImageFormat::Bmp)?;
    info!("Wrote {}", path.display());
    Ok(())
}
