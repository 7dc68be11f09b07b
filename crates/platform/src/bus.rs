//! Panel bus abstraction
//!
//! The smallest surface a command sequence needs from the hardware: command
//! and data writes (DC low / DC high), blocking sleeps, BUSY polling and a
//! reset pulse. Everything above this trait is hardware independent.

/// Blocking SPI + GPIO bus to a single e-ink controller.
pub trait Bus {
    /// Transport error (SPI or GPIO failure)
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Send one command byte with DC low.
    fn write_command(&mut self, cmd: u8) -> Result<(), Self::Error>;

    /// Send one data byte with DC high.
    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Send a run of data bytes with DC high.
    ///
    /// The default writes byte by byte. Adapters that can burst should
    /// override it.
    fn write_data_bulk(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for byte in bytes {
            self.write_data(*byte)?;
        }
        Ok(())
    }

    /// Block for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u64);

    /// Wait until BUSY reports idle.
    ///
    /// Returns `Ok(true)` once the controller is idle and `Ok(false)` if it
    /// is still busy after `timeout_ms`.
    fn busy_wait(&mut self, timeout_ms: u64) -> Result<bool, Self::Error>;

    /// Pulse the RST line low then high.
    fn pulse_reset(&mut self) -> Result<(), Self::Error>;
}

impl<B: Bus + ?Sized> Bus for &mut B {
    type Error = B::Error;

    fn write_command(&mut self, cmd: u8) -> Result<(), Self::Error> {
        (**self).write_command(cmd)
    }

    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write_data(byte)
    }

    fn write_data_bulk(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write_data_bulk(bytes)
    }

    fn sleep_ms(&mut self, ms: u64) {
        (**self).sleep_ms(ms);
    }

    fn busy_wait(&mut self, timeout_ms: u64) -> Result<bool, Self::Error> {
        (**self).busy_wait(timeout_ms)
    }

    fn pulse_reset(&mut self) -> Result<(), Self::Error> {
        (**self).pulse_reset()
    }
}
