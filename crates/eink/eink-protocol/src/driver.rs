//! Protocol driver
//!
//! Replays [`CommandSequence`]s against a [`Bus`]. Consecutive data bytes
//! are coalesced into one bulk write, and frame payloads are streamed in
//! fixed-size chunks as the data phase of the RAM-write command.
//!
//! Hardware sequences run to completion or fail; there is no cancellation
//! and no retry at this layer.

use platform::Bus;
use tracing::{debug, trace, warn};

use crate::command::{Command, CommandSequence};
use crate::error::ProtocolError;

/// Default BUSY timeout per `CheckStatus`.
///
/// A full refresh on the larger panels takes several seconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 10_000;

/// Default payload chunk size (the Linux spidev default buffer size).
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Executes command sequences on an owned bus.
#[derive(Debug)]
pub struct ProtocolDriver<B> {
    bus: B,
    busy_timeout_ms: u64,
    chunk_size: usize,
}

impl<B: Bus> ProtocolDriver<B> {
    /// Driver with default timeout and chunk size.
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the per-`CheckStatus` BUSY timeout.
    #[must_use]
    pub fn with_busy_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }

    /// Override the payload chunk size. Zero is raised to 1.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Configured BUSY timeout
    pub fn busy_timeout_ms(&self) -> u64 {
        self.busy_timeout_ms
    }

    /// Borrow the bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back.
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Replay `seq` in order.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::HardwareTimeout`] when a `CheckStatus` expires
    /// - [`ProtocolError::Bus`] on any transport failure
    ///
    /// Commands after the failing one are not sent.
    pub fn execute(&mut self, seq: &CommandSequence) -> Result<(), ProtocolError> {
        debug!(commands = seq.len(), "executing sequence");

        let mut pending: Vec<u8> = Vec::new();
        for command in seq {
            if let Command::Data(byte) = command {
                pending.push(*byte);
                continue;
            }
            self.flush_data(&mut pending)?;
            match *command {
                Command::Cmd(op) => {
                    trace!(op, "command");
                    self.bus.write_command(op).map_err(bus_error)?;
                }
                Command::Delay(ms) => self.bus.sleep_ms(ms),
                Command::CheckStatus => self.check_status()?,
                Command::Reset => self.bus.pulse_reset().map_err(bus_error)?,
                Command::Data(_) => {}
            }
        }
        self.flush_data(&mut pending)
    }

    /// Replay `before`, send `write_ram_cmd` followed by `payload` as its
    /// data phase, then replay `after`.
    ///
    /// The payload length is not checked here; validate it against the
    /// firmware first.
    pub fn execute_with_payload(
        &mut self,
        before: &CommandSequence,
        write_ram_cmd: u8,
        payload: &[u8],
        after: &CommandSequence,
    ) -> Result<(), ProtocolError> {
        self.execute(before)?;

        debug!(cmd = write_ram_cmd, bytes = payload.len(), "writing frame");
        self.bus.write_command(write_ram_cmd).map_err(bus_error)?;
        for chunk in payload.chunks(self.chunk_size) {
            self.bus.write_data_bulk(chunk).map_err(bus_error)?;
        }

        self.execute(after)
    }

    fn flush_data(&mut self, pending: &mut Vec<u8>) -> Result<(), ProtocolError> {
        if pending.is_empty() {
            return Ok(());
        }
        let result = self.bus.write_data_bulk(pending).map_err(bus_error);
        pending.clear();
        result
    }

    fn check_status(&mut self) -> Result<(), ProtocolError> {
        let timeout_ms = self.busy_timeout_ms;
        if self.bus.busy_wait(timeout_ms).map_err(bus_error)? {
            Ok(())
        } else {
            warn!(timeout_ms, "controller busy timeout");
            Err(ProtocolError::HardwareTimeout { timeout_ms })
        }
    }
}

fn bus_error<E: core::fmt::Display>(err: E) -> ProtocolError {
    ProtocolError::Bus(err.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
