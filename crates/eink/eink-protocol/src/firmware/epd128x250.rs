//! 2.13" 128x250 panel, SSD1680
//!
//! Data entry mode 0x01 (X+, Y-): RAM Y runs from gate 249 down to 0 so the
//! first packed row lands on the top gate.

use eink_specs::DisplaySpec;

use super::{
    last_gate, last_x_byte, le16, reset_and_soft_reset, DisplayFirmware, DisplayMode,
    FirmwareType, UPDATE_FULL,
};
use crate::command::{CommandSequence, Opcode};

/// Partial refresh flags for this panel's OTP waveform.
pub const UPDATE_PARTIAL: u8 = 0xFF;

/// Border waveform after init (follow LUT, VBD = VSH).
const BORDER_FULL: u8 = 0x05;

/// Border waveform in partial mode (VBD floating).
const BORDER_PARTIAL: u8 = 0x80;

/// EPD128x250 firmware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Epd128x250;

impl DisplayFirmware for Epd128x250 {
    fn firmware_type(&self) -> FirmwareType {
        FirmwareType::Epd128x250
    }

    fn spec(&self) -> &'static DisplaySpec {
        &eink_specs::displays::EPD_128X250
    }

    fn init_sequence(&self) -> CommandSequence {
        let spec = self.spec();
        let [gate_lo, gate_hi] = le16(last_gate(spec));

        reset_and_soft_reset(self)
            .cmd_data(Opcode::DriverOutputControl, &[gate_lo, gate_hi, 0x00])
            .cmd_data(Opcode::DataEntryMode, &[0x01])
            .cmd_data(Opcode::SetRamXRange, &[0x00, last_x_byte(spec)])
            .cmd_data(Opcode::SetRamYRange, &[gate_lo, gate_hi, 0x00, 0x00])
            .cmd_data(Opcode::BorderWaveform, &[BORDER_FULL])
            .cmd_data(Opcode::DisplayUpdateCtrl1, &[0x00, 0x80])
            .cmd_data(Opcode::TempSensorControl, &[0x80])
            .cmd_data(Opcode::SetRamXCounter, &[0x00])
            .cmd_data(Opcode::SetRamYCounter, &[gate_lo, gate_hi])
            .check_status()
    }

    fn partial_init_sequence(&self) -> CommandSequence {
        CommandSequence::new().cmd_data(Opcode::BorderWaveform, &[BORDER_PARTIAL])
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    #[rustfmt::skip]
    fn test_init_byte_sequence() {
        use Command::{CheckStatus, Cmd, Data, Delay, Reset};

        let expected = [
            Reset,
            Delay(10),
            CheckStatus,
            Cmd(0x12),
            CheckStatus,
            Cmd(0x01), Data(0xF9), Data(0x00), Data(0x00),
            Cmd(0x11), Data(0x01),
            Cmd(0x44), Data(0x00), Data(0x0F),
            Cmd(0x45), Data(0xF9), Data(0x00), Data(0x00), Data(0x00),
            Cmd(0x3C), Data(0x05),
            Cmd(0x21), Data(0x00), Data(0x80),
            Cmd(0x18), Data(0x80),
            Cmd(0x4E), Data(0x00),
            Cmd(0x4F), Data(0xF9), Data(0x00),
            CheckStatus,
        ];
        assert_eq!(Epd128x250.init_sequence().as_slice(), &expected);
    }

    #[test]
    fn test_partial_init_sets_border() {
        assert_eq!(
            Epd128x250.partial_init_sequence().as_slice(),
            &[Command::Cmd(0x3C), Command::Data(0x80)]
        );
    }

    #[test]
    fn test_update_flags() {
        let full = Epd128x250.update_sequence(DisplayMode::Full);
        let partial = Epd128x250.update_sequence(DisplayMode::Partial);
        assert_eq!(full.data_for(0x22).unwrap(), vec![0xF7]);
        assert_eq!(partial.data_for(0x22).unwrap(), vec![0xFF]);
    }
}
