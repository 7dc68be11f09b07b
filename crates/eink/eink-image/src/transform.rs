//! Geometric transforms: orientation, scaling, inversion
//!
//! All transforms work on 8-bit grayscale and use Lanczos3 resampling.

// Scale factors are finite and positive (checked) and results are clamped
// to the target size before casting back to u32.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::arithmetic_side_effects
)]

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

use crate::error::ImageError;
use crate::options::{ProcessingOptions, Rotation, ScalingMethod};

const FILTER: FilterType = FilterType::Lanczos3;

/// Apply horizontal flip, vertical flip, then clockwise rotation.
pub fn orient(img: GrayImage, options: &ProcessingOptions) -> GrayImage {
    let mut img = img;
    if options.flip_horizontal {
        img = imageops::flip_horizontal(&img);
    }
    if options.flip_vertical {
        img = imageops::flip_vertical(&img);
    }
    match options.rotation {
        Rotation::None => img,
        Rotation::Rotate90 => imageops::rotate90(&img),
        Rotation::Rotate180 => imageops::rotate180(&img),
        Rotation::Rotate270 => imageops::rotate270(&img),
    }
}

/// Fit `img` to exactly `width` x `height`.
///
/// # Errors
///
/// `Processing { stage: "scale" }` for an empty source or target, or a scale
/// factor that is not finite.
pub fn scale(
    img: &GrayImage,
    width: u32,
    height: u32,
    options: &ProcessingOptions,
) -> Result<GrayImage, ImageError> {
    let (src_w, src_h) = img.dimensions();
    if src_w == 0 || src_h == 0 {
        return Err(ImageError::processing("scale", "source image is empty"));
    }
    if width == 0 || height == 0 {
        return Err(ImageError::processing("scale", "target size is empty"));
    }
    if (src_w, src_h) == (width, height) {
        return Ok(img.clone());
    }

    let scale_w = f64::from(width) / f64::from(src_w);
    let scale_h = f64::from(height) / f64::from(src_h);

    match options.scaling {
        ScalingMethod::Stretch => Ok(imageops::resize(img, width, height, FILTER)),

        ScalingMethod::CropCenter => {
            let factor = finite(scale_w.max(scale_h))?;
            let (left, crop_w) = crop_span(src_w, width, factor, options.crop_x);
            let (top, crop_h) = crop_span(src_h, height, factor, options.crop_y);

            // Crop in source pixels first so the resize never exceeds the target.
            let window = imageops::crop_imm(img, left, top, crop_w, crop_h).to_image();
            Ok(imageops::resize(&window, width, height, FILTER))
        }

        ScalingMethod::Letterbox => {
            let factor = finite(scale_w.min(scale_h))?;
            let new_w = ((f64::from(src_w) * factor).round() as u32).clamp(1, width);
            let new_h = ((f64::from(src_h) * factor).round() as u32).clamp(1, height);
            let scaled = imageops::resize(img, new_w, new_h, FILTER);

            let mut canvas = GrayImage::from_pixel(width, height, Luma([255]));
            let x = (width - new_w) / 2;
            let y = (height - new_h) / 2;
            imageops::replace(&mut canvas, &scaled, i64::from(x), i64::from(y));
            Ok(canvas)
        }
    }
}

/// `255 - v` for every pixel.
pub fn invert(img: &mut GrayImage) {
    imageops::invert(img);
}

/// Source-space `(offset, length)` of the crop window along one axis.
///
/// `offset` is given in scaled pixels, as the caller sees the image after
/// scaling, and is clamped so the window stays inside the source.
fn crop_span(src: u32, target: u32, factor: f64, offset: Option<u32>) -> (u32, u32) {
    let scaled = ((f64::from(src) * factor).round() as u32).max(target);
    let max_offset = scaled - target;
    let offset = offset.unwrap_or(max_offset / 2).min(max_offset);

    let len = ((f64::from(target) / factor).round() as u32).clamp(1, src);
    let start = ((f64::from(offset) / factor).round() as u32).min(src - len);
    (start, len)
}

fn finite(factor: f64) -> Result<f64, ImageError> {
    if factor.is_finite() && factor > 0.0 {
        Ok(factor)
    } else {
        Err(ImageError::processing(
            "scale",
            format!("invalid scale factor {factor}"),
        ))
    }
}
