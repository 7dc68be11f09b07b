//! Display errors

use cache::CacheError;
use eink_image::ImageError;
use eink_protocol::{ProtocolError, UnknownFirmware};
use eink_specs::{DimensionMismatch, SizeMismatch};

/// Anything that can go wrong between an input image and the panel.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    /// Decode, scale or dither failure.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Controller timeout or transport failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Raw frame with the wrong length. Detected before any bus traffic.
    #[error(transparent)]
    SizeMismatch(#[from] SizeMismatch),

    /// Packed frame built for a panel with other dimensions.
    #[error(transparent)]
    Dimensions(#[from] DimensionMismatch),

    /// Persistence write failure.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Rejected configuration value.
    #[error("invalid display configuration: {0}")]
    Config(String),
}

impl From<UnknownFirmware> for DisplayError {
    fn from(e: UnknownFirmware) -> Self {
        Self::Config(e.to_string())
    }
}

impl DisplayError {
    /// `true` for busy timeouts and bus failures.
    pub fn is_hardware(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::HardwareTimeout { .. } | ProtocolError::Bus(_)))
    }
}
