//! Hardware abstraction for e-ink panels
//!
//! This crate provides the bus trait every protocol driver runs over,
//! enabling development and testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Display facade (display crate)
//!         ↓
//! Protocol driver (eink-protocol)
//!         ↓
//! Platform HAL (this crate - Bus trait)
//!         ↓
//! embedded-hal 1.0 SPI / GPIO / delay (linux-embedded-hal, MCU HALs, ...)
//! ```
//!
//! # Features
//!
//! - `mock`: Enable [`mocks::MockBus`] for downstream tests
//!
//! # Example
//!
//! ```
//! use platform::Bus;
//!
//! fn wake<B: Bus>(bus: &mut B) -> Result<(), B::Error> {
//!     bus.pulse_reset()?;
//!     bus.sleep_ms(10);
//!     bus.write_command(0x12)
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod bus;
pub mod hal_bus;
pub mod mocks;

pub use bus::Bus;
pub use hal_bus::{BusError, HalBus, DEFAULT_POLL_INTERVAL_MS};
