//! Float color to byte conversions for display and image output.

use crate::math::{Vec3, Vec4};

/// Scale from `[0, 1]` to a byte; just under 256 so 1.0 still maps to 255.
const TO_BYTE: f32 = 255.9;

/// Converts one channel, clamping out-of-range values.
#[inline]
pub fn to_byte(value: f32) -> u8 {
    (value * TO_BYTE).clamp(0.0, 255.0) as u8
}

/// RGB bytes of a color; alpha is dropped.
#[inline]
pub fn to_rgb8(color: Vec4) -> [u8; 3] {
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

/// Packs a color as `0xAARRGGBB`, the layout of an ARGB8888 streaming texture.
#[inline]
pub fn to_argb8888(color: Vec4) -> u32 {
    u32::from_be_bytes([
        to_byte(color.w),
        to_byte(color.x),
        to_byte(color.y),
        to_byte(color.z),
    ])
}

/// Gray level for a single-channel value such as depth.
#[inline]
pub fn to_gray8(value: f32) -> u8 {
    to_byte(value)
}

/// A framebuffer element the display sink can show.
pub trait DisplayTexel: Copy {
    fn to_argb8888(self) -> u32;
}

impl DisplayTexel for Vec4 {
    #[inline]
    fn to_argb8888(self) -> u32 {
        to_argb8888(self)
    }
}

/// Bytes in `[r, g, b, a]` order.
impl DisplayTexel for [u8; 4] {
    #[inline]
    fn to_argb8888(self) -> u32 {
        let [r, g, b, a] = self;
        u32::from_be_bytes([a, r, g, b])
    }
}

/// Opaque color from RGB.
#[inline]
pub fn opaque(rgb: Vec3) -> Vec4 {
    Vec4::from_vec3(rgb, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_clamp_to_byte_range() {
        assert_eq!(to_byte(1.0), 255);
        assert_eq!(to_byte(0.0), 0);
        assert_eq!(to_byte(-3.0), 0);
        assert_eq!(to_byte(7.5), 255);
        assert_eq!(to_byte(0.5), 127);
    }

    #[test]
    fn argb_packing_order() {
        let packed = to_argb8888(Vec4::new(1.0, 0.0, 0.5, 1.0));
        assert_eq!(packed, 0xFF_FF_00_7F);
    }

    #[test]
    fn byte_and_float_texels_pack_alike() {
        let float = DisplayTexel::to_argb8888(Vec4::new(1.0, 0.0, 0.5, 1.0));
        let bytes = DisplayTexel::to_argb8888([255u8, 0, 127, 255]);
        assert_eq!(float, bytes);
    }

    #[test]
    fn cleared_depth_is_white() {
        assert_eq!(to_gray8(f32::MAX), 255);
    }

    #[test]
    fn rgb_drops_alpha() {
        assert_eq!(to_rgb8(opaque(Vec3::new(0.0, 1.0, 0.0))), [0, 255, 0]);
    }
}
