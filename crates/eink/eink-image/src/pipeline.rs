//! Image to packed frame pipeline
//!
//! ```text
//! bytes ─▶ decode ─▶ grayscale ─▶ flip/rotate ─▶ scale ─▶ invert ─▶ dither ─▶ pack
//! ```
//!
//! The cancel token is checked between stages and between dither rows.

use std::path::Path;
use std::time::Instant;

use eink_specs::{pack, DisplaySpec, PackedBuffer};
use image::DynamicImage;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::decode::{decode, to_gray};
use crate::dither::dither;
use crate::error::ImageError;
use crate::options::ProcessingOptions;
use crate::transform::{invert, orient, scale};

/// Decode `bytes` and produce a frame for `spec`.
pub fn process_and_pack(
    bytes: &[u8],
    options: &ProcessingOptions,
    spec: &DisplaySpec,
) -> Result<PackedBuffer, ImageError> {
    process_and_pack_with_cancel(bytes, options, spec, &CancelToken::new())
}

/// [`process_and_pack`] with a cancellation token.
pub fn process_and_pack_with_cancel(
    bytes: &[u8],
    options: &ProcessingOptions,
    spec: &DisplaySpec,
    cancel: &CancelToken,
) -> Result<PackedBuffer, ImageError> {
    cancel.check()?;
    let img = decode(bytes)?;
    process_image(&img, options, spec, cancel)
}

/// Read a file and produce a frame for `spec`.
pub fn process_file(
    path: impl AsRef<Path>,
    options: &ProcessingOptions,
    spec: &DisplaySpec,
) -> Result<PackedBuffer, ImageError> {
    let bytes = std::fs::read(path)?;
    process_and_pack(&bytes, options, spec)
}

/// Run every stage after decode on an already decoded image.
pub fn process_image(
    img: &DynamicImage,
    options: &ProcessingOptions,
    spec: &DisplaySpec,
    cancel: &CancelToken,
) -> Result<PackedBuffer, ImageError> {
    let started = Instant::now();
    let (src_w, src_h) = (img.width(), img.height());

    cancel.check()?;
    let gray = orient(to_gray(img), options);

    cancel.check()?;
    let mut gray = scale(&gray, spec.width, spec.height, options)?;
    if options.invert {
        invert(&mut gray);
    }

    cancel.check()?;
    let bits = dither(&gray, options.dithering, cancel)?;

    cancel.check()?;
    let packed = pack(&bits, spec).map_err(|e| ImageError::processing("pack", e.to_string()))?;

    debug!(
        src_w,
        src_h,
        panel = spec.name,
        bytes = packed.len(),
        elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
        "image packed"
    );
    Ok(packed)
}
