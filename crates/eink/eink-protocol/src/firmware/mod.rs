//! Firmware variants
//!
//! A firmware variant is the panel-specific part of the protocol: which
//! bytes bring the controller up, how a refresh is triggered, and which
//! [`DisplaySpec`] the packed frames must match. The set is closed; select
//! one through [`FirmwareType`].

mod epd122x250;
mod epd128x250;
mod epd240x416;

use core::fmt;
use core::str::FromStr;

use eink_specs::{DisplaySpec, SizeMismatch};

use crate::command::{CommandSequence, Opcode};

pub use epd122x250::Epd122x250;
pub use epd128x250::Epd128x250;
pub use epd240x416::Epd240x416;

/// Display Update Control 2 flags: full refresh with OTP waveform.
pub const UPDATE_FULL: u8 = 0xF7;

/// Reset pulse settle time in milliseconds.
const RESET_SETTLE_MS: u64 = 10;

/// Deep sleep settle time in milliseconds.
const SLEEP_SETTLE_MS: u64 = 100;

// ---------------------------------------------------------------------------
// DisplayMode
// ---------------------------------------------------------------------------

/// Refresh mode for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayMode {
    /// Full refresh: flashes, clears ghosting
    #[default]
    Full,
    /// Partial refresh: fast, reuses RAM, may ghost
    Partial,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Panel-specific command sequences.
///
/// All methods are pure: they describe bytes and timing, the driver sends
/// them.
///
/// # Partial refresh
///
/// [`partial_init_sequence`](Self::partial_init_sequence) switches the
/// border waveform (and restores any registers a reset pulse clears); it
/// assumes [`init_sequence`](Self::init_sequence) has run
/// at least once since power-up or deep sleep. A partial update without a
/// prior partial init is not rejected, it just refreshes with the full-mode
/// border.
pub trait DisplayFirmware: fmt::Debug + Send + Sync {
    /// Which variant this is.
    fn firmware_type(&self) -> FirmwareType;

    /// Panel geometry packed frames must match.
    fn spec(&self) -> &'static DisplaySpec;

    /// Reset pulse, software reset and register setup. Idempotent.
    fn init_sequence(&self) -> CommandSequence;

    /// Switch to RAM-reusing partial mode.
    fn partial_init_sequence(&self) -> CommandSequence;

    /// Trigger a refresh of whatever is in RAM.
    fn update_sequence(&self, mode: DisplayMode) -> CommandSequence;

    /// Hardware reset pulse plus settle delay.
    fn reset_sequence(&self) -> CommandSequence {
        CommandSequence::new().reset().delay(RESET_SETTLE_MS)
    }

    /// Enter deep sleep. The controller needs a reset and init to wake.
    fn sleep_sequence(&self) -> CommandSequence {
        CommandSequence::new()
            .check_status()
            .cmd_data(Opcode::DeepSleep, &[0x01])
            .delay(SLEEP_SETTLE_MS)
    }

    /// Opcode whose data phase receives the packed frame.
    fn write_ram_command(&self) -> u8 {
        Opcode::WriteRamBW.into()
    }

    /// Check a raw frame against [`spec`](Self::spec).
    fn validate_size(&self, buffer: &[u8]) -> Result<(), SizeMismatch> {
        self.spec().validate_len(buffer.len())
    }
}

// ---------------------------------------------------------------------------
// FirmwareType
// ---------------------------------------------------------------------------

/// The closed set of supported firmware variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FirmwareType {
    /// 2.13" 128x250, SSD1680
    #[default]
    Epd128x250,
    /// 2.13" 122x250, SSD1680 (non byte-aligned rows)
    Epd122x250,
    /// 3.7" 240x416, SSD1677
    Epd240x416,
}

impl FirmwareType {
    /// Every variant.
    pub const ALL: [FirmwareType; 3] = [Self::Epd128x250, Self::Epd122x250, Self::Epd240x416];

    /// Canonical name, e.g. `"EPD128x250"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Epd128x250 => "EPD128x250",
            Self::Epd122x250 => "EPD122x250",
            Self::Epd240x416 => "EPD240x416",
        }
    }

    /// Panel geometry for this variant.
    pub fn spec(self) -> &'static DisplaySpec {
        match self {
            Self::Epd128x250 => &eink_specs::displays::EPD_128X250,
            Self::Epd122x250 => &eink_specs::displays::EPD_122X250,
            Self::Epd240x416 => &eink_specs::displays::EPD_240X416,
        }
    }

    /// Instantiate the firmware.
    pub fn create(self) -> Box<dyn DisplayFirmware> {
        match self {
            Self::Epd128x250 => Box::new(Epd128x250),
            Self::Epd122x250 => Box::new(Epd122x250),
            Self::Epd240x416 => Box::new(Epd240x416),
        }
    }
}

impl fmt::Display for FirmwareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Firmware name that matches no supported variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown firmware type {0:?}, supported types: EPD128x250, EPD122x250, EPD240x416")]
pub struct UnknownFirmware(pub String);

impl FromStr for FirmwareType {
    type Err = UnknownFirmware;

    /// Accepts `"EPD128x250"` or the bare geometry `"128x250"`, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let geometry = lower.strip_prefix("epd").unwrap_or(&lower);
        match geometry {
            "128x250" => Ok(Self::Epd128x250),
            "122x250" => Ok(Self::Epd122x250),
            "240x416" => Ok(Self::Epd240x416),
            _ => Err(UnknownFirmware(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared SSD16xx helpers
// ---------------------------------------------------------------------------

/// Little-endian 16-bit register value.
pub(crate) fn le16(value: u32) -> [u8; 2] {
    let value = u16::try_from(value).unwrap_or(u16::MAX);
    value.to_le_bytes()
}

/// Last RAM column byte (`bytes_per_row - 1`).
pub(crate) fn last_x_byte(spec: &DisplaySpec) -> u8 {
    u8::try_from(spec.bytes_per_row().saturating_sub(1)).unwrap_or(u8::MAX)
}

/// Last gate line (`height - 1`).
pub(crate) fn last_gate(spec: &DisplaySpec) -> u32 {
    spec.height.saturating_sub(1)
}

/// Reset pulse, BUSY, software reset, BUSY.
pub(crate) fn reset_and_soft_reset(fw: &dyn DisplayFirmware) -> CommandSequence {
    fw.reset_sequence()
        .check_status()
        .cmd(Opcode::SoftReset)
        .check_status()
}
