//! E-ink display entry point
//!
//! Ties the pieces together: images are converted by `eink-image`, cached
//! by fingerprint in `cache`, and written to the panel through the firmware
//! variant's command sequences and the `eink-protocol` driver.
//!
//! ```
//! use display::{DisplayConfig, EinkDisplay};
//! use eink_image::ProcessingOptions;
//! use eink_protocol::{DisplayMode, FirmwareType};
//! use platform::mocks::MockBus;
//!
//! # let png = eink_testing::fixtures::gradient_png(64, 64);
//! let bus = MockBus::new();
//! let display = EinkDisplay::new(bus.clone(), DisplayConfig::new(FirmwareType::Epd122x250))?;
//!
//! display.show_image(&png, &ProcessingOptions::default(), DisplayMode::Full)?;
//! assert!(display.is_initialized());
//! assert_eq!(bus.data_after(0x24).len(), 4000);
//!
//! display.shutdown()?;
//! # Ok::<(), display::DisplayError>(())
//! ```

#![warn(missing_docs)]

mod config;
#[allow(clippy::module_inception)]
mod display;
mod error;

pub use config::DisplayConfig;
pub use display::{EinkDisplay, PanelState};
pub use error::DisplayError;

pub use cache::CacheStats;
pub use eink_image::{
    is_format_supported, CancelToken, DitheringMethod, ProcessingOptions, Rotation, ScalingMethod,
};
pub use eink_protocol::{DisplayMode, FirmwareType};
pub use eink_specs::{DimensionMismatch, DisplaySpec, PackedBuffer};
