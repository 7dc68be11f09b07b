//! E-ink controller protocol
//!
//! Command sequences, the per-panel firmware variants that produce them, and
//! a driver that replays them over a [`platform::Bus`].
//!
//! # Example
//!
//! ```
//! use eink_protocol::{DisplayMode, FirmwareType, ProtocolDriver};
//! use eink_specs::PackedBuffer;
//! use platform::mocks::MockBus;
//!
//! let fw = FirmwareType::Epd128x250.create();
//! let frame = PackedBuffer::white(fw.spec());
//!
//! let mut driver = ProtocolDriver::new(MockBus::new());
//! driver.execute(&fw.init_sequence()).unwrap();
//! driver
//!     .execute_with_payload(
//!         &Default::default(),
//!         fw.write_ram_command(),
//!         frame.as_bytes(),
//!         &fw.update_sequence(DisplayMode::Full),
//!     )
//!     .unwrap();
//! ```

#![warn(missing_docs)]

pub mod command;
pub mod driver;
mod error;
pub mod firmware;

pub use command::{Command, CommandSequence, Opcode};
pub use driver::{ProtocolDriver, DEFAULT_BUSY_TIMEOUT_MS};
pub use error::ProtocolError;
pub use firmware::{DisplayFirmware, DisplayMode, FirmwareType, UnknownFirmware};
