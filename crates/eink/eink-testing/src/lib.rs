//! E-Ink Frame Testing Utilities
//!
//! Synthetic input images and assertions over packed frames, so tests can
//! talk about pixels instead of bytes.
//!
//! # Quick start
//!
//! ```
//! use eink_testing::{fixtures, FrameProbe};
//! use eink_specs::{displays::EPD_122X250, PackedBuffer};
//!
//! let png = fixtures::solid_png(32, 32, 0);
//! assert!(!png.is_empty());
//!
//! let frame = PackedBuffer::black(&EPD_122X250);
//! let probe = FrameProbe::new(&frame);
//! probe.assert_pixel(121, 249, false).unwrap();
//! probe.assert_padding_white().unwrap();
//! ```
//!
//! # Golden frame testing
//!
//! ```no_run
//! # use eink_testing::FrameProbe;
//! # use eink_specs::{displays::EPD_128X250, PackedBuffer};
//! # let frame = PackedBuffer::white(&EPD_128X250);
//! // First run: set UPDATE_GOLDEN=1 to create/update the reference file.
//! FrameProbe::new(&frame).assert_matches_golden("tests/golden/white.png").unwrap();
//! ```

#![warn(clippy::all)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![allow(clippy::module_name_repetitions)]

pub mod fixtures;

use std::path::Path;

use eink_specs::PackedBuffer;
use image::{GrayImage, Luma};

pub use eink_specs::DisplaySpec;

// ─────────────────────────────────────────────────────────────────────────────
// FrameProbe
// ─────────────────────────────────────────────────────────────────────────────

/// Pixel-level assertions over a packed frame.
///
/// Every assertion returns `Err(message)` instead of panicking so callers can
/// `unwrap()` in tests and get a readable failure.
#[derive(Debug, Clone, Copy)]
pub struct FrameProbe<'a> {
    frame: &'a PackedBuffer,
}

impl<'a> FrameProbe<'a> {
    /// Wrap a frame.
    pub fn new(frame: &'a PackedBuffer) -> Self {
        Self { frame }
    }

    /// Pixel color, `Some(true)` for white.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<bool> {
        self.frame.pixel(x, y)
    }

    /// Assert a single pixel.
    pub fn assert_pixel(&self, x: u32, y: u32, white: bool) -> Result<(), String> {
        let actual = self
            .pixel_at(x, y)
            .ok_or_else(|| format!("Pixel ({x}, {y}) is out of bounds"))?;
        if actual == white {
            Ok(())
        } else {
            Err(format!(
                "Pixel ({x}, {y}): expected {}, got {}",
                color_name(white),
                color_name(actual)
            ))
        }
    }

    /// Assert every pixel of a rectangle has one color.
    pub fn assert_region_uniform(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        white: bool,
    ) -> Result<(), String> {
        for py in y..y.saturating_add(height) {
            for px in x..x.saturating_add(width) {
                self.assert_pixel(px, py, white).map_err(|e| {
                    format!("assert_region_uniform failed in ({x}, {y}, {width}x{height}): {e}")
                })?;
            }
        }
        Ok(())
    }

    /// Black pixels in the whole frame (padding excluded).
    pub fn black_count(&self) -> usize {
        self.frame.to_bit_matrix().count_black()
    }

    /// Assert that the fraction of black pixels is within `[min, max]`.
    pub fn assert_black_ratio(&self, min: f64, max: f64) -> Result<(), String> {
        let total = f64::from(self.frame.width()) * f64::from(self.frame.height());
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.black_count() as f64 / total.max(1.0);
        if (min..=max).contains(&ratio) {
            Ok(())
        } else {
            Err(format!("black ratio {ratio:.3} outside [{min}, {max}]"))
        }
    }

    /// Assert that no padding bit was cleared.
    pub fn assert_padding_white(&self) -> Result<(), String> {
        if self.frame.padding_is_white() {
            Ok(())
        } else {
            Err("row padding bits must stay white".to_string())
        }
    }

    /// Render the frame as an 8-bit grayscale image (0 or 255).
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.frame.width(), self.frame.height(), |x, y| {
            Luma([if self.pixel_at(x, y).unwrap_or(true) { 255 } else { 0 }])
        })
    }

    /// Save a PNG rendering of the frame.
    pub fn screenshot(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        self.to_image().save(path)?;
        Ok(())
    }

    /// Compare against a golden PNG.
    ///
    /// With `UPDATE_GOLDEN=1` the golden file is (re)written instead.
    pub fn assert_matches_golden(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let path = path.as_ref();
        if std::env::var_os("UPDATE_GOLDEN").is_some() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
            }
            return self
                .screenshot(path)
                .map_err(|e| format!("Failed to write golden {}: {e}", path.display()));
        }

        let golden = image::open(path)
            .map_err(|e| {
                format!(
                    "Failed to open golden {} (run with UPDATE_GOLDEN=1 to create it): {e}",
                    path.display()
                )
            })?
            .to_luma8();
        let current = self.to_image();
        if golden.dimensions() != current.dimensions() {
            return Err(format!(
                "Golden is {:?}, frame is {:?}",
                golden.dimensions(),
                current.dimensions()
            ));
        }
        let diff = golden
            .pixels()
            .zip(current.pixels())
            .filter(|(a, b)| a != b)
            .count();
        if diff == 0 {
            Ok(())
        } else {
            Err(format!("{diff} pixels differ from golden {}", path.display()))
        }
    }
}

fn color_name(white: bool) -> &'static str {
    if white {
        "white"
    } else {
        "black"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
