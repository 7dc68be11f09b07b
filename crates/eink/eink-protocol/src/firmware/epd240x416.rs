//! 3.7" 240x416 panel, SSD1677
//!
//! SSD1677 takes 16-bit RAM X addresses and needs the booster soft-start
//! values written before the first refresh. Red RAM is bypassed on full
//! refresh (B/W only).

use eink_specs::DisplaySpec;

use super::{last_gate, last_x_byte, le16, DisplayFirmware, DisplayMode, FirmwareType, UPDATE_FULL};
use crate::command::{CommandSequence, Opcode};

/// Partial refresh flags.
pub const UPDATE_PARTIAL: u8 = 0xFC;

/// Booster soft-start phase settings.
const BOOSTER: [u8; 5] = [0xAE, 0xC7, 0xC3, 0xC0, 0x80];

/// Settle time after software reset before polling BUSY.
const SOFT_RESET_SETTLE_MS: u64 = 10;

/// EPD240x416 firmware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Epd240x416;

impl DisplayFirmware for Epd240x416 {
    fn firmware_type(&self) -> FirmwareType {
        FirmwareType::Epd240x416
    }

    fn spec(&self) -> &'static DisplaySpec {
        &eink_specs::displays::EPD_240X416
    }

    fn init_sequence(&self) -> CommandSequence {
        let spec = self.spec();
        let [gate_lo, gate_hi] = le16(last_gate(spec));
        let [x_end_lo, x_end_hi] = le16(u32::from(last_x_byte(spec)));

        self.reset_sequence()
            .check_status()
            .cmd(Opcode::SoftReset)
            .delay(SOFT_RESET_SETTLE_MS)
            .check_status()
            .cmd_data(Opcode::TempSensorControl, &[0x80])
            .cmd_data(Opcode::BoosterSoftStart, &BOOSTER)
            .cmd_data(Opcode::DriverOutputControl, &[gate_lo, gate_hi, 0x00])
            .cmd_data(Opcode::BorderWaveform, &[0x01])
            .cmd_data(Opcode::DataEntryMode, &[0x03])
            .cmd_data(Opcode::SetRamXRange, &[0x00, 0x00, x_end_lo, x_end_hi])
            .cmd_data(Opcode::SetRamYRange, &[0x00, 0x00, gate_lo, gate_hi])
            .cmd_data(Opcode::SetRamXCounter, &[0x00, 0x00])
            .cmd_data(Opcode::SetRamYCounter, &[0x00, 0x00])
            .check_status()
    }

    fn partial_init_sequence(&self) -> CommandSequence {
        CommandSequence::new()
            .cmd_data(Opcode::BorderWaveform, &[0x80])
            .cmd_data(Opcode::DisplayUpdateCtrl1, &[0x00, 0x00])
    }

    fn update_sequence(&self, mode: DisplayMode) -> CommandSequence {
        let seq = match mode {
            DisplayMode::Full => CommandSequence::new()
                .cmd_data(Opcode::DisplayUpdateCtrl1, &[0x40, 0x00])
                .cmd_data(Opcode::DisplayUpdateCtrl2, &[UPDATE_FULL]),
            DisplayMode::Partial => {
                CommandSequence::new().cmd_data(Opcode::DisplayUpdateCtrl2, &[UPDATE_PARTIAL])
            }
        };
        seq.cmd(Opcode::MasterActivation).check_status()
    }
}
