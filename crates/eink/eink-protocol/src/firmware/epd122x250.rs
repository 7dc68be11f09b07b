//! 2.13" 122x250 panel, SSD1680
//!
//! 122 source lines means each RAM row is 16 bytes with 6 trailing padding
//! bits. Data entry mode 0x03 (X+, Y+) with the window starting at gate 0.
//! Partial mode re-pulses reset before switching the border waveform. The
//! controller keeps RAM across a hardware reset but not its registers, so
//! gate count, entry mode and window are written again.

use eink_specs::DisplaySpec;

use super::{
    last_gate, last_x_byte, le16, reset_and_soft_reset, DisplayFirmware, DisplayMode,
    FirmwareType, UPDATE_FULL,
};
use crate::command::{CommandSequence, Opcode};

/// Partial refresh flags.
pub const UPDATE_PARTIAL: u8 = 0xFF;

/// EPD122x250 firmware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Epd122x250;

impl Epd122x250 {
    /// Gate count and data entry mode, lost on every hardware reset.
    fn geometry(&self, seq: CommandSequence) -> CommandSequence {
        let [gate_lo, gate_hi] = le16(last_gate(self.spec()));
        seq.cmd_data(Opcode::DriverOutputControl, &[gate_lo, gate_hi, 0x00])
            .cmd_data(Opcode::DataEntryMode, &[0x03])
    }

    fn window(&self, seq: CommandSequence) -> CommandSequence {
        let spec = self.spec();
        let [end_lo, end_hi] = le16(last_gate(spec));
        seq.cmd_data(Opcode::SetRamXRange, &[0x00, last_x_byte(spec)])
            .cmd_data(Opcode::SetRamYRange, &[0x00, 0x00, end_lo, end_hi])
            .cmd_data(Opcode::SetRamXCounter, &[0x00])
            .cmd_data(Opcode::SetRamYCounter, &[0x00, 0x00])
    }
}

impl DisplayFirmware for Epd122x250 {
    fn firmware_type(&self) -> FirmwareType {
        FirmwareType::Epd122x250
    }

    fn spec(&self) -> &'static DisplaySpec {
        &eink_specs::displays::EPD_122X250
    }

    fn init_sequence(&self) -> CommandSequence {
        let seq = self.geometry(reset_and_soft_reset(self));
        self.window(seq)
            .cmd_data(Opcode::BorderWaveform, &[0x05])
            .cmd_data(Opcode::DisplayUpdateCtrl1, &[0x00, 0x80])
            .cmd_data(Opcode::TempSensorControl, &[0x80])
            .check_status()
    }

    fn partial_init_sequence(&self) -> CommandSequence {
        let seq = self
            .reset_sequence()
            .cmd_data(Opcode::BorderWaveform, &[0x80]);
        self.window(self.geometry(seq)).check_status()
    }

    fn update_sequence(&self, mode: DisplayMode) -> CommandSequence {
        let flags = match mode {
            DisplayMode::Full => UPDATE_FULL,
            DisplayMode::Partial => UPDATE_PARTIAL,
        };
        CommandSequence::new()
            .cmd_data(Opcode::DisplayUpdateCtrl2, &[flags])
            .cmd(Opcode::MasterActivation)
            .check_status()
    }
}
