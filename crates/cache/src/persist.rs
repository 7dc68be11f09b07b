//! Persistence file format.
//!
//! One file: a 16-byte header followed by a postcard-encoded list of
//! entries, least recently used first so a reload keeps the LRU order.
//!
//! Layout (all multi-byte integers little-endian):
//! ```text
//! [0..4]   magic        b"EKCH"
//! [4]      version      u8 = 1
//! [5..8]   _pad         [u8; 3]
//! [8..12]  entry_count  u32 le
//! [12..16] body_crc32   u32 le  (CRC32 of everything after the header)
//! [16..]   body         postcard Vec<PersistedEntry>
//! ```

use std::fs;
use std::io;
use std::path::Path;

use eink_image::ProcessingOptions;
use eink_protocol::FirmwareType;
use eink_specs::PackedBuffer;
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Reasons a persistence file is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum FormatError {
    #[error("file shorter than the header")]
    Truncated,
    #[error("magic bytes are not EKCH")]
    BadMagic,
    #[error("unsupported version {0}")]
    UnsupportedVersion(u8),
    #[error("body checksum mismatch")]
    ChecksumMismatch,
    #[error("body holds {body} entries, header says {header}")]
    CountMismatch { header: u32, body: usize },
    #[error("body does not decode")]
    Decode,
}

/// Fixed file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CacheHeader {
    pub entry_count: u32,
    pub body_crc32: u32,
}

impl CacheHeader {
    pub const SIZE: usize = 16;
    pub const MAGIC: &'static [u8; 4] = b"EKCH";
    pub const VERSION: u8 = 1;

    /// # Safety (lint allow)
    /// All range indices are constants within `[0, SIZE)`.
    #[allow(clippy::indexing_slicing)]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(Self::MAGIC);
        buf[4] = Self::VERSION;
        buf[8..12].copy_from_slice(&self.entry_count.to_le_bytes());
        buf[12..16].copy_from_slice(&self.body_crc32.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, FormatError> {
        let header = buf.get(..Self::SIZE).ok_or(FormatError::Truncated)?;
        if header.get(0..4) != Some(Self::MAGIC.as_ref()) {
            return Err(FormatError::BadMagic);
        }
        match header.get(4).copied() {
            Some(Self::VERSION) => {}
            Some(v) => return Err(FormatError::UnsupportedVersion(v)),
            None => return Err(FormatError::Truncated),
        }
        Ok(Self {
            entry_count: le_u32(header, 8)?,
            body_crc32: le_u32(header, 12)?,
        })
    }
}

fn le_u32(buf: &[u8], at: usize) -> Result<u32, FormatError> {
    let bytes = buf
        .get(at..at.saturating_add(4))
        .and_then(|s| <[u8; 4]>::try_from(s).ok())
        .ok_or(FormatError::Truncated)?;
    Ok(u32::from_le_bytes(bytes))
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// One stored frame.
///
/// The firmware is stored by name so a panel that no longer exists drops
/// only its own entries instead of failing the whole body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PersistedEntry {
    pub content_crc32: u32,
    pub content_len: u64,
    pub options: ProcessingOptions,
    pub firmware: String,
    pub bytes: Vec<u8>,
}

impl PersistedEntry {
    pub fn new(fingerprint: &Fingerprint, packed: &PackedBuffer) -> Self {
        Self {
            content_crc32: fingerprint.content_crc32,
            content_len: fingerprint.content_len,
            options: fingerprint.options,
            firmware: fingerprint.firmware.as_str().to_string(),
            bytes: packed.as_bytes().to_vec(),
        }
    }

    /// `None` when the firmware no longer resolves or the frame length no
    /// longer matches its panel.
    pub fn resolve(self) -> Option<(Fingerprint, PackedBuffer)> {
        let firmware: FirmwareType = self.firmware.parse().ok()?;
        let packed = PackedBuffer::from_bytes(firmware.spec(), self.bytes).ok()?;
        let fingerprint = Fingerprint {
            content_crc32: self.content_crc32,
            content_len: self.content_len,
            options: self.options,
            firmware,
        };
        Some((fingerprint, packed))
    }
}

/// Header plus body.
pub(crate) fn encode(entries: &[PersistedEntry]) -> Result<Vec<u8>, postcard::Error> {
    let body = postcard::to_stdvec(entries)?;
    let header = CacheHeader {
        entry_count: u32::try_from(entries.len()).map_err(|_| postcard::Error::SerializeBufferFull)?,
        body_crc32: crc32fast::hash(&body),
    };
    let mut out = Vec::with_capacity(CacheHeader::SIZE.saturating_add(body.len()));
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Validate and decode a whole file.
pub(crate) fn decode(file: &[u8]) -> Result<Vec<PersistedEntry>, FormatError> {
    let header = CacheHeader::decode(file)?;
    let body = file.get(CacheHeader::SIZE..).ok_or(FormatError::Truncated)?;
    if crc32fast::hash(body) != header.body_crc32 {
        return Err(FormatError::ChecksumMismatch);
    }
    let entries: Vec<PersistedEntry> =
        postcard::from_bytes(body).map_err(|_| FormatError::Decode)?;
    if u32::try_from(entries.len()).ok() != Some(header.entry_count) {
        return Err(FormatError::CountMismatch {
            header: header.entry_count,
            body: entries.len(),
        });
    }
    Ok(entries)
}

/// Write through a sibling temp file and rename, so a crash mid-write
/// leaves the previous file intact.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
