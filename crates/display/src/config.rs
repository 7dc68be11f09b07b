//! Display configuration
//!
//! Plain values built by the caller. With the `serde` feature the struct can
//! be read from whatever config file the application already has; this crate
//! never reads files or environment variables itself.

use std::path::PathBuf;

use cache::{CacheConfig, DEFAULT_CAPACITY};
use eink_protocol::{FirmwareType, DEFAULT_BUSY_TIMEOUT_MS};

use crate::error::DisplayError;

/// Everything needed to open a display.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayConfig {
    /// Panel variant
    pub firmware: FirmwareType,
    /// Cached frames kept in memory (`0` disables caching)
    pub cache_capacity: usize,
    /// Cache file, loaded on open and written on shutdown
    pub cache_persist_path: Option<PathBuf>,
    /// BUSY wait limit per status check
    pub busy_timeout_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            firmware: FirmwareType::default(),
            cache_capacity: DEFAULT_CAPACITY,
            cache_persist_path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl DisplayConfig {
    /// Defaults for `firmware`.
    pub fn new(firmware: FirmwareType) -> Self {
        Self {
            firmware,
            ..Self::default()
        }
    }

    /// Defaults for a firmware given by name, e.g. `"EPD240x416"`.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Config`] if the name matches no variant.
    pub fn from_firmware_name(name: &str) -> Result<Self, DisplayError> {
        Ok(Self::new(name.parse()?))
    }

    /// Set the firmware.
    #[must_use]
    pub fn with_firmware(mut self, firmware: FirmwareType) -> Self {
        self.firmware = firmware;
        self
    }

    /// Set the cache capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Persist the cache at `path`.
    #[must_use]
    pub fn with_cache_persist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_persist_path = Some(path.into());
        self
    }

    /// Set the BUSY timeout.
    #[must_use]
    pub fn with_busy_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }

    /// Reject values that cannot work.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Config`] for a zero BUSY timeout or an empty
    /// persistence path.
    pub fn validate(&self) -> Result<(), DisplayError> {
        if self.busy_timeout_ms == 0 {
            return Err(DisplayError::Config("busy_timeout_ms must be positive".into()));
        }
        if self
            .cache_persist_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(DisplayError::Config("cache_persist_path is empty".into()));
        }
        Ok(())
    }

    pub(crate) fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            capacity: self.cache_capacity,
            persist_path: self.cache_persist_path.clone(),
        }
    }
}
