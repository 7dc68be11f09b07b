//! Decode and grayscale normalization

use image::{DynamicImage, GrayImage, Luma};

use crate::error::ImageError;

/// Decode any enabled format, guessing it from the content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes).map_err(ImageError::Decode)
}

/// 8-bit luma of an RGB triple, `(77r + 151g + 30b) >> 8`.
#[inline]
#[allow(clippy::arithmetic_side_effects)] // u8 inputs widened to u32: cannot overflow
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let sum = 77 * u32::from(r) + 151 * u32::from(g) + 30 * u32::from(b);
    // 77 + 151 + 30 = 258, so 255 * 258 >> 8 = 256: clamp the top.
    u8::try_from(sum >> 8).unwrap_or(u8::MAX)
}

/// Composite one channel over white.
#[inline]
#[allow(clippy::arithmetic_side_effects)] // a <= 255, so 255 - a and the sum stay in range
fn over_white(c: u8, a: u8) -> u8 {
    let (c, a) = (u32::from(c), u32::from(a));
    let v = (c * a + 255 * (255 - a) + 127) / 255;
    u8::try_from(v).unwrap_or(u8::MAX)
}

/// Flatten to grayscale: alpha composited onto white, then [`luma`].
pub fn to_gray(img: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = img {
        return gray.clone();
    }
    let rgba = img.to_rgba8();
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Luma([luma(over_white(r, a), over_white(g, a), over_white(b, a))])
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        let gray = to_gray(&DynamicImage::ImageRgba8(img));
        assert_eq!(gray.get_pixel(0, 0).0, [255]);
        assert_eq!(gray.get_pixel(1, 0).0, [0]);
    }

    #[test]
    fn test_half_alpha_black_is_mid_gray() {
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 128]));
        let gray = to_gray(&DynamicImage::ImageRgba8(img));
        assert_eq!(gray.get_pixel(0, 0).0, [127]);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(matches!(
            decode(b"definitely not an image"),
            Err(ImageError::Decode(_))
        ));
    }
}
