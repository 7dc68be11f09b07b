//! Protocol errors

use eink_specs::SizeMismatch;

/// Failures while talking to the controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// BUSY stayed asserted past the timeout.
    #[error("controller still busy after {timeout_ms} ms")]
    HardwareTimeout {
        /// Timeout that expired
        timeout_ms: u64,
    },

    /// SPI or GPIO transport failure.
    #[error("bus error: {0}")]
    Bus(String),

    /// Frame does not match the panel's RAM size.
    #[error(transparent)]
    SizeMismatch(#[from] SizeMismatch),
}
