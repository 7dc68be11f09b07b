//! Controller opcodes and replayable command sequences
//!
//! A [`CommandSequence`] is plain data. Building one never touches hardware;
//! the [`ProtocolDriver`](crate::ProtocolDriver) replays it against a bus.

// ---------------------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------------------

/// SSD1680 / SSD1677 command codes used by the shipped firmware variants.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Driver output control: 3 data bytes (gate count low, high, scan).
    DriverOutputControl = 0x01,
    /// Booster soft-start: 4 or 5 data bytes.
    BoosterSoftStart = 0x0C,
    /// Deep sleep: 1 data byte (0x01 = preserve RAM).
    DeepSleep = 0x10,
    /// Data entry mode: 1 data byte.
    DataEntryMode = 0x11,
    /// Software reset: 0 data bytes; poll BUSY after.
    SoftReset = 0x12,
    /// Temperature sensor control: 1 data byte (0x80 = internal).
    TempSensorControl = 0x18,
    /// Master activation: 0 data bytes; triggers panel update.
    MasterActivation = 0x20,
    /// Display update control 1: 2 data bytes.
    DisplayUpdateCtrl1 = 0x21,
    /// Display update control 2: 1 data byte (sequence flags).
    DisplayUpdateCtrl2 = 0x22,
    /// Write RAM (B/W): pixel data; 0=black, 1=white, MSB-first.
    WriteRamBW = 0x24,
    /// Write RAM (Red / previous frame).
    WriteRamRed = 0x26,
    /// Border waveform control: 1 data byte.
    BorderWaveform = 0x3C,
    /// Set RAM X start/end address.
    SetRamXRange = 0x44,
    /// Set RAM Y start/end address.
    SetRamYRange = 0x45,
    /// Set RAM X address counter.
    SetRamXCounter = 0x4E,
    /// Set RAM Y address counter.
    SetRamYCounter = 0x4F,
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> Self {
        op as u8
    }
}

// ---------------------------------------------------------------------------
// Sequence
// ---------------------------------------------------------------------------

/// One step of a controller sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Command byte (DC low)
    Cmd(u8),
    /// Data byte (DC high)
    Data(u8),
    /// Blocking delay in milliseconds
    Delay(u64),
    /// Wait for BUSY to report idle
    CheckStatus,
    /// Pulse the RST line
    Reset,
}

/// Ordered list of [`Command`]s, built by chained appends.
///
/// ```
/// use eink_protocol::{Command, CommandSequence, Opcode};
///
/// let seq = CommandSequence::new()
///     .check_status()
///     .cmd_data(Opcode::DeepSleep, &[0x01])
///     .delay(100);
///
/// assert_eq!(seq.len(), 4);
/// assert_eq!(seq.as_slice()[1], Command::Cmd(0x10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSequence {
    commands: Vec<Command>,
}

impl CommandSequence {
    /// Empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw command.
    #[must_use]
    pub fn push(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Append a command byte.
    #[must_use]
    pub fn cmd(self, cmd: impl Into<u8>) -> Self {
        self.push(Command::Cmd(cmd.into()))
    }

    /// Append a data byte.
    #[must_use]
    pub fn data(self, byte: u8) -> Self {
        self.push(Command::Data(byte))
    }

    /// Append data bytes in order.
    #[must_use]
    pub fn data_slice(mut self, bytes: &[u8]) -> Self {
        self.commands.extend(bytes.iter().copied().map(Command::Data));
        self
    }

    /// Command byte followed by its data bytes.
    #[must_use]
    pub fn cmd_data(self, cmd: impl Into<u8>, bytes: &[u8]) -> Self {
        self.cmd(cmd).data_slice(bytes)
    }

    /// Append a delay.
    #[must_use]
    pub fn delay(self, ms: u64) -> Self {
        self.push(Command::Delay(ms))
    }

    /// Append a BUSY check.
    #[must_use]
    pub fn check_status(self) -> Self {
        self.push(Command::CheckStatus)
    }

    /// Append a reset pulse.
    #[must_use]
    pub fn reset(self) -> Self {
        self.push(Command::Reset)
    }

    /// Append every command of `other`.
    #[must_use]
    pub fn then(mut self, other: CommandSequence) -> Self {
        self.commands.extend(other.commands);
        self
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True when there is nothing to replay
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate in replay order.
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Commands as a slice
    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }

    /// Command bytes only, in order. Handy for protocol assertions.
    pub fn opcodes(&self) -> Vec<u8> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Cmd(op) => Some(*op),
                _ => None,
            })
            .collect()
    }

    /// Data bytes following the first occurrence of `cmd`, up to the next
    /// command byte.
    pub fn data_for(&self, cmd: impl Into<u8>) -> Option<Vec<u8>> {
        let cmd = cmd.into();
        let start = self.commands.iter().position(|c| *c == Command::Cmd(cmd))?;
        Some(
            self.commands
                .iter()
                .skip(start.saturating_add(1))
                .take_while(|c| !matches!(c, Command::Cmd(_)))
                .filter_map(|c| match c {
                    Command::Data(d) => Some(*d),
                    _ => None,
                })
                .collect(),
        )
    }
}

impl Extend<Command> for CommandSequence {
    fn extend<T: IntoIterator<Item = Command>>(&mut self, iter: T) {
        self.commands.extend(iter);
    }
}

impl FromIterator<Command> for CommandSequence {
    fn from_iter<T: IntoIterator<Item = Command>>(iter: T) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CommandSequence {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
