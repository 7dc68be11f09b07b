//! Synthetic encoded images
//!
//! Every fixture returns PNG bytes so it goes through the real decoder.

#![allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)]

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgba, RgbaImage};

/// Encode any image as PNG.
pub fn encode_png(img: &DynamicImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    // An encode failure leaves no bytes, which the decoder then rejects.
    match img.write_to(&mut out, ImageFormat::Png) {
        Ok(()) => out.into_inner(),
        Err(_) => Vec::new(),
    }
}

/// Uniform gray image.
pub fn solid_png(width: u32, height: u32, luma: u8) -> Vec<u8> {
    encode_png(&DynamicImage::ImageLuma8(GrayImage::from_pixel(
        width,
        height,
        Luma([luma]),
    )))
}

/// Left-to-right ramp from black to white.
pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let span = width.saturating_sub(1).max(1);
    encode_png(&DynamicImage::ImageLuma8(GrayImage::from_fn(
        width,
        height,
        |x, _| Luma([(x * 255 / span) as u8]),
    )))
}

/// Checkerboard of `cell`-pixel squares, black at the origin.
pub fn checker_png(width: u32, height: u32, cell: u32) -> Vec<u8> {
    let cell = cell.max(1);
    encode_png(&DynamicImage::ImageLuma8(GrayImage::from_fn(
        width,
        height,
        |x, y| Luma([if (x / cell + y / cell) % 2 == 0 { 0 } else { 255 }]),
    )))
}

/// Black RGBA image whose alpha ramps from transparent (left) to opaque.
pub fn alpha_ramp_png(width: u32, height: u32) -> Vec<u8> {
    let span = width.saturating_sub(1).max(1);
    encode_png(&DynamicImage::ImageRgba8(RgbaImage::from_fn(
        width,
        height,
        |x, _| Rgba([0, 0, 0, (x * 255 / span) as u8]),
    )))
}

/// Solid RGB color.
pub fn color_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let [r, g, b] = rgb;
    encode_png(&DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([r, g, b, 255]),
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_decode_to_requested_size() {
        for bytes in [
            solid_png(9, 4, 10),
            gradient_png(9, 4),
            checker_png(9, 4, 2),
            alpha_ramp_png(9, 4),
            color_png(9, 4, [255, 0, 0]),
        ] {
            let img = image::load_from_memory(&bytes).unwrap();
            assert_eq!((img.width(), img.height()), (9, 4));
        }
    }
}
