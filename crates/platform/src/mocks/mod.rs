//! Mock implementations for testing
//!
//! [`MockBus`] records every bus operation instead of touching hardware.
//! Clones share one log, so a test can keep a handle while the bus itself is
//! moved into a driver.

#![cfg(any(test, feature = "mock"))]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::bus::Bus;

/// One recorded bus operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    /// Command byte (DC low)
    Command(u8),
    /// Data byte (DC high)
    Data(u8),
    /// Blocking sleep
    Sleep(u64),
    /// BUSY wait with its timeout
    BusyWait(u64),
    /// RST pulse
    Reset,
}

/// Error injected by [`MockBus::fail_after`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("mock bus failure after {0} operations")]
pub struct MockBusError(pub usize);

#[derive(Debug, Default)]
struct State {
    ops: Vec<BusOp>,
    busy_script: VecDeque<bool>,
    fail_after: Option<usize>,
}

/// Recording bus. BUSY reports idle unless scripted otherwise.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<State>>,
}

impl MockBus {
    /// Create an empty mock bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue results for upcoming `busy_wait` calls. `false` means the wait
    /// timed out. Once the queue is empty every wait succeeds.
    pub fn script_busy(&self, results: impl IntoIterator<Item = bool>) {
        self.lock().busy_script.extend(results);
    }

    /// Fail every write once `count` operations have been recorded.
    pub fn fail_after(&self, count: usize) {
        self.lock().fail_after = Some(count);
    }

    /// Snapshot of all recorded operations
    pub fn ops(&self) -> Vec<BusOp> {
        self.lock().ops.clone()
    }

    /// Recorded command bytes in order
    pub fn commands(&self) -> Vec<u8> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Command(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Data bytes sent after the last occurrence of `cmd`, up to the next
    /// command. Empty if `cmd` was never sent.
    pub fn data_after(&self, cmd: u8) -> Vec<u8> {
        let state = self.lock();
        let Some(start) = state
            .ops
            .iter()
            .rposition(|op| *op == BusOp::Command(cmd))
        else {
            return Vec::new();
        };
        state
            .ops
            .iter()
            .skip(start.saturating_add(1))
            .take_while(|op| !matches!(op, BusOp::Command(_)))
            .filter_map(|op| match op {
                BusOp::Data(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// Number of times `cmd` was sent
    pub fn count_command(&self, cmd: u8) -> usize {
        self.lock()
            .ops
            .iter()
            .filter(|op| **op == BusOp::Command(cmd))
            .count()
    }

    /// Forget all recorded operations
    pub fn clear(&self) {
        self.lock().ops.clear();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, op: BusOp) -> Result<(), MockBusError> {
        let mut state = self.lock();
        if let Some(limit) = state.fail_after {
            if state.ops.len() >= limit {
                return Err(MockBusError(limit));
            }
        }
        state.ops.push(op);
        Ok(())
    }
}

impl Bus for MockBus {
    type Error = MockBusError;

    fn write_command(&mut self, cmd: u8) -> Result<(), Self::Error> {
        self.record(BusOp::Command(cmd))
    }

    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.record(BusOp::Data(byte))
    }

    fn sleep_ms(&mut self, ms: u64) {
        let _ = self.record(BusOp::Sleep(ms));
    }

    fn busy_wait(&mut self, timeout_ms: u64) -> Result<bool, Self::Error> {
        self.record(BusOp::BusyWait(timeout_ms))?;
        Ok(self.lock().busy_script.pop_front().unwrap_or(true))
    }

    fn pulse_reset(&mut self) -> Result<(), Self::Error> {
        self.record(BusOp::Reset)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_log() {
        let handle = MockBus::new();
        let mut bus = handle.clone();
        bus.write_command(0x24).unwrap();
        bus.write_data_bulk(&[1, 2, 3]).unwrap();
        bus.write_command(0x22).unwrap();

        assert_eq!(handle.commands(), vec![0x24, 0x22]);
        assert_eq!(handle.data_after(0x24), vec![1, 2, 3]);
        assert!(handle.data_after(0x22).is_empty());
        assert!(handle.data_after(0x99).is_empty());
    }

    #[test]
    fn test_busy_script_then_idle() {
        let mut bus = MockBus::new();
        bus.script_busy([false]);
        assert!(!bus.busy_wait(100).unwrap());
        assert!(bus.busy_wait(100).unwrap());
        assert_eq!(bus.ops(), vec![BusOp::BusyWait(100), BusOp::BusyWait(100)]);
    }

    #[test]
    fn test_fail_after() {
        let mut bus = MockBus::new();
        bus.fail_after(1);
        assert!(bus.write_command(0x12).is_ok());
        assert_eq!(bus.write_data(0x00), Err(MockBusError(1)));
        assert_eq!(bus.count_command(0x12), 1);
    }
}
