//! [`Bus`] over `embedded-hal` 1.0 blocking traits
//!
//! Pin roles:
//! - DC   low = command, high = data
//! - RST  active low
//! - BUSY active high (controller busy while high)
//!
//! `SpiDevice` owns chip select, one transaction per write.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::bus::Bus;

/// Default BUSY poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 5;

/// RST low time and post-reset settle time in milliseconds.
const RESET_PULSE_MS: u32 = 10;

/// Transport failures from [`HalBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// SPI write failed.
    #[error("SPI communication error")]
    Spi,
    /// DC, RST or BUSY pin operation failed.
    #[error("GPIO error")]
    Gpio,
}

/// Bus adapter for an e-ink controller wired to SPI plus three GPIOs.
pub struct HalBus<SPI, DC, RST, BUSY, DELAY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    delay: DELAY,
    poll_interval_ms: u32,
}

impl<SPI, DC, RST, BUSY, DELAY> HalBus<SPI, DC, RST, BUSY, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    DELAY: DelayNs,
{
    /// Create an adapter polling BUSY every [`DEFAULT_POLL_INTERVAL_MS`].
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY, delay: DELAY) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            delay,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Override the BUSY poll interval. Zero is raised to 1 ms.
    #[must_use]
    pub fn with_poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms.max(1);
        self
    }

    /// Release the owned peripherals.
    pub fn release(self) -> (SPI, DC, RST, BUSY, DELAY) {
        (self.spi, self.dc, self.rst, self.busy, self.delay)
    }
}

impl<SPI, DC, RST, BUSY, DELAY> Bus for HalBus<SPI, DC, RST, BUSY, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    DELAY: DelayNs,
{
    type Error = BusError;

    fn write_command(&mut self, cmd: u8) -> Result<(), Self::Error> {
        self.dc.set_low().map_err(|_| BusError::Gpio)?;
        self.spi.write(&[cmd]).map_err(|_| BusError::Spi)
    }

    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.write_data_bulk(&[byte])
    }

    fn write_data_bulk(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.dc.set_high().map_err(|_| BusError::Gpio)?;
        self.spi.write(bytes).map_err(|_| BusError::Spi)
    }

    fn sleep_ms(&mut self, ms: u64) {
        let ms = u32::try_from(ms).unwrap_or(u32::MAX);
        self.delay.delay_ms(ms);
    }

    fn busy_wait(&mut self, timeout_ms: u64) -> Result<bool, Self::Error> {
        let step = u64::from(self.poll_interval_ms);
        let mut waited = 0u64;
        loop {
            if self.busy.is_low().map_err(|_| BusError::Gpio)? {
                return Ok(true);
            }
            if waited >= timeout_ms {
                return Ok(false);
            }
            self.delay.delay_ms(self.poll_interval_ms);
            waited = waited.saturating_add(step);
        }
    }

    fn pulse_reset(&mut self) -> Result<(), Self::Error> {
        self.rst.set_low().map_err(|_| BusError::Gpio)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_high().map_err(|_| BusError::Gpio)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
