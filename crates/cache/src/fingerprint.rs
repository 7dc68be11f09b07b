//! Cache keys

use eink_image::ProcessingOptions;
use eink_protocol::FirmwareType;

/// Everything that determines the bytes of a packed frame.
///
/// The firmware is part of the key so a hit can never return a buffer
/// sized for a different panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// CRC32 of the encoded source image.
    pub content_crc32: u32,
    /// Length of the encoded source image.
    pub content_len: u64,
    /// Processing options.
    pub options: ProcessingOptions,
    /// Target panel.
    pub firmware: FirmwareType,
}

impl Fingerprint {
    /// Key for `content` processed with `options` for `firmware`.
    pub fn new(content: &[u8], options: &ProcessingOptions, firmware: FirmwareType) -> Self {
        Self {
            content_crc32: crc32fast::hash(content),
            content_len: u64::try_from(content.len()).unwrap_or(u64::MAX),
            options: *options,
            firmware,
        }
    }
}
