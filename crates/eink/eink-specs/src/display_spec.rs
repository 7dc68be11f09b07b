//! Display specification types
//!
//! Defines the fixed geometry and identity of a 1-bit e-ink panel and the
//! derived RAM layout the controller expects.

/// Complete specification of an e-ink panel variant.
///
/// Geometry is given in the controller's native orientation: `width` is the
/// number of source outputs (pixels per RAM row) and `height` the number of
/// gate outputs (RAM rows).
///
/// The RAM layout is row-padded. Every row occupies
/// [`bytes_per_row`](Self::bytes_per_row) bytes, so a 122-pixel-wide panel
/// uses 16 bytes per row and leaves 6 padding bits at the end of each row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DisplaySpec {
    /// Short identifier (e.g., "EPD128x250")
    pub name: &'static str,

    /// Human readable description of the panel
    pub description: &'static str,

    /// Width in pixels (source outputs)
    pub width: u32,

    /// Height in pixels (gate outputs)
    pub height: u32,

    /// Display controller chip
    pub controller: Controller,
}

// Panel dimensions are small compile-time constants.
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
impl DisplaySpec {
    /// Bytes occupied by one RAM row, `ceil(width / 8)`.
    pub const fn bytes_per_row(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Exact length of a packed frame for this panel.
    ///
    /// Always computed from padded rows. `width * height / 8` is wrong for
    /// any width that is not a multiple of 8.
    pub const fn array_size(&self) -> usize {
        self.bytes_per_row() * self.height as usize
    }

    /// Unused bits at the end of each row (0 for byte-aligned widths, up to 7).
    pub const fn padding_bits(&self) -> u32 {
        (self.bytes_per_row() as u32) * 8 - self.width
    }

    /// Total pixel count (`width * height`).
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Get display aspect ratio (width / height)
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Check a buffer length against [`array_size`](Self::array_size).
    ///
    /// # Errors
    ///
    /// Returns [`SizeMismatch`] when the length differs by any amount.
    pub fn validate_len(&self, actual: usize) -> Result<(), SizeMismatch> {
        let expected = self.array_size();
        if actual == expected {
            Ok(())
        } else {
            Err(SizeMismatch { expected, actual })
        }
    }
}

impl core::fmt::Display for DisplaySpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({}x{})", self.name, self.width, self.height)
    }
}

/// E-ink display controller chips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Controller {
    /// Solomon Systech SSD1680 (2.13" class panels)
    SSD1680,
    /// Solomon Systech SSD1677 (larger panels, 16-bit RAM X addressing)
    SSD1677,
}

impl Controller {
    /// Datasheet name of the controller
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SSD1680 => "SSD1680",
            Self::SSD1677 => "SSD1677",
        }
    }
}

/// A packed buffer had the wrong number of bytes for the target panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
pub struct SizeMismatch {
    /// `DisplaySpec::array_size` of the target panel
    pub expected: usize,
    /// Length of the rejected buffer
    pub actual: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_spec(width: u32, height: u32) -> DisplaySpec {
        DisplaySpec {
            name: "Test Display",
            description: "test fixture",
            width,
            height,
            controller: Controller::SSD1680,
        }
    }

    #[test]
    fn test_byte_aligned_width_has_no_padding() {
        let spec = test_spec(128, 250);
        assert_eq!(spec.bytes_per_row(), 16);
        assert_eq!(spec.array_size(), 4000);
        assert_eq!(spec.padding_bits(), 0);
    }

    #[test]
    fn test_unaligned_width_pads_each_row() {
        let spec = test_spec(122, 250);
        assert_eq!(spec.bytes_per_row(), 16);
        assert_eq!(spec.array_size(), 4000);
        assert_eq!(spec.padding_bits(), 6);
        // A flat division would truncate to 3812 bytes.
        assert_ne!(spec.array_size(), spec.pixel_count() / 8);
    }

    #[test]
    fn test_single_pixel_width() {
        let spec = test_spec(1, 3);
        assert_eq!(spec.bytes_per_row(), 1);
        assert_eq!(spec.array_size(), 3);
        assert_eq!(spec.padding_bits(), 7);
    }

    #[test]
    fn test_validate_len_rejects_off_by_one() {
        let spec = test_spec(122, 250);
        assert!(spec.validate_len(4000).is_ok());
        assert_eq!(
            spec.validate_len(3999),
            Err(SizeMismatch {
                expected: 4000,
                actual: 3999
            })
        );
        assert_eq!(
            spec.validate_len(4001),
            Err(SizeMismatch {
                expected: 4000,
                actual: 4001
            })
        );
    }

    #[test]
    fn test_size_mismatch_message() {
        let err = SizeMismatch {
            expected: 4000,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "buffer size mismatch: expected 4000 bytes, got 12"
        );
    }

    #[test]
    fn test_display_format() {
        assert_eq!(test_spec(128, 250).to_string(), "Test Display (128x250)");
    }

    #[cfg(feature = "serde")]
    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_serialize_spec() {
        let json = serde_json::to_string(&test_spec(122, 250)).unwrap();
        assert!(json.contains("\"width\":122"));
        assert!(json.contains("\"controller\":\"SSD1680\""));
    }

    #[test]
    fn test_aspect_ratio() {
        let spec = test_spec(250, 122);
        assert!((spec.aspect_ratio() - 2.049).abs() < 0.01);
    }
}
