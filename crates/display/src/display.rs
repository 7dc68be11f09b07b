//! `EinkDisplay`: images in, refreshed panel out.
//!
//! The panel is an exclusive resource: one mutex covers the driver and the
//! controller state for a whole logical operation (init, one frame, clear,
//! sleep), command phase and BUSY phase included. Image processing runs
//! before that lock is taken, so callers preparing different images do not
//! wait on each other or on the panel.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use cache::{CacheStats, Fingerprint, ImageCache};
use eink_image::{CancelToken, ProcessingOptions};
use eink_protocol::{CommandSequence, DisplayFirmware, DisplayMode, FirmwareType, ProtocolDriver};
use eink_specs::{DimensionMismatch, DisplaySpec, PackedBuffer};
use platform::Bus;
use tracing::{debug, info, warn};

use crate::config::DisplayConfig;
use crate::error::DisplayError;

/// Controller state as far as the host knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Not initialised since open or reset
    Uninitialized,
    /// Initialised; `partial` once the partial init ran
    Ready {
        /// Partial refresh mode active
        partial: bool,
    },
    /// Deep sleep; the next frame wakes it with a full init
    Asleep,
}

struct Panel<B: Bus> {
    driver: ProtocolDriver<B>,
    state: PanelState,
}

/// A panel plus its frame cache.
pub struct EinkDisplay<B: Bus> {
    firmware: Box<dyn DisplayFirmware>,
    panel: Mutex<Panel<B>>,
    cache: ImageCache,
}

impl<B: Bus> EinkDisplay<B> {
    /// Open a display on `bus`.
    ///
    /// Loads the persisted cache if configured. Sends nothing to the panel;
    /// the first frame (or an explicit [`init`](Self::init)) does that.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Config`] if the configuration does not validate.
    pub fn new(bus: B, config: DisplayConfig) -> Result<Self, DisplayError> {
        config.validate()?;
        let firmware = config.firmware.create();
        let driver = ProtocolDriver::new(bus).with_busy_timeout_ms(config.busy_timeout_ms);
        let cache = ImageCache::new(config.cache_config());
        info!(
            firmware = firmware.firmware_type().as_str(),
            cached = cache.len(),
            "display opened"
        );
        Ok(Self {
            firmware,
            panel: Mutex::new(Panel {
                driver,
                state: PanelState::Uninitialized,
            }),
            cache,
        })
    }

    /// Selected firmware variant.
    pub fn firmware_type(&self) -> FirmwareType {
        self.firmware.firmware_type()
    }

    /// Panel geometry.
    pub fn spec(&self) -> &'static DisplaySpec {
        self.firmware.spec()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        let spec = self.spec();
        (spec.width, spec.height)
    }

    /// Current controller state.
    pub fn state(&self) -> PanelState {
        self.lock_panel().state
    }

    /// `true` once an init sequence has run and the panel is not asleep.
    pub fn is_initialized(&self) -> bool {
        matches!(self.state(), PanelState::Ready { .. })
    }

    fn lock_panel(&self) -> MutexGuard<'_, Panel<B>> {
        match self.panel.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // A panic mid-sequence leaves the controller in an unknown
                // state; force a fresh init before the next frame.
                self.panel.clear_poison();
                let mut guard = poisoned.into_inner();
                guard.state = PanelState::Uninitialized;
                guard
            }
        }
    }

    // -----------------------------------------------------------------------
    // Hardware
    // -----------------------------------------------------------------------

    /// Run the full init sequence.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Protocol`] on busy timeout or bus failure.
    pub fn init(&self) -> Result<(), DisplayError> {
        let mut panel = self.lock_panel();
        self.init_locked(&mut panel)
    }

    fn init_locked(&self, panel: &mut Panel<B>) -> Result<(), DisplayError> {
        panel.state = PanelState::Uninitialized;
        panel.driver.execute(&self.firmware.init_sequence())?;
        panel.state = PanelState::Ready { partial: false };
        info!(firmware = self.firmware.firmware_type().as_str(), "panel initialised");
        Ok(())
    }

    /// Switch to partial refresh mode, running the full init first if needed.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Protocol`] on busy timeout or bus failure.
    pub fn init_partial(&self) -> Result<(), DisplayError> {
        let mut panel = self.lock_panel();
        if !matches!(panel.state, PanelState::Ready { .. }) {
            self.init_locked(&mut panel)?;
        }
        panel.driver.execute(&self.firmware.partial_init_sequence())?;
        panel.state = PanelState::Ready { partial: true };
        debug!("partial mode enabled");
        Ok(())
    }

    /// Write a packed frame and refresh.
    ///
    /// Accepts a [`PackedBuffer`] or any raw slice of exactly
    /// [`DisplaySpec::array_size`] bytes. The length is checked before any
    /// bus traffic. The panel is initialised first if it has not been, or
    /// woken if it is asleep.
    ///
    /// A [`DisplayMode::Partial`] refresh without a prior
    /// [`init_partial`](Self::init_partial) is sent as is.
    ///
    /// # Errors
    ///
    /// [`DisplayError::SizeMismatch`] for a wrong length,
    /// [`DisplayError::Protocol`] on busy timeout or bus failure.
    ///
    /// Only the length is checked, so a buffer packed for another panel
    /// with the same `array_size` is accepted. Use
    /// [`show_frame`](Self::show_frame) to also check the geometry.
    pub fn show(&self, frame: impl AsRef<[u8]>, mode: DisplayMode) -> Result<(), DisplayError> {
        let bytes = frame.as_ref();
        self.firmware.validate_size(bytes)?;
        self.write_frame(bytes, mode)
    }

    /// Show a [`PackedBuffer`] after checking it was packed for this panel.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Dimensions`] when the frame's width or height differs
    /// from the panel's, otherwise as [`show`](Self::show).
    pub fn show_frame(&self, frame: &PackedBuffer, mode: DisplayMode) -> Result<(), DisplayError> {
        let spec = self.spec();
        if !frame.fits(spec) {
            return Err(DisplayError::Dimensions(DimensionMismatch {
                width: spec.width,
                height: spec.height,
                actual_width: frame.width(),
                actual_height: frame.height(),
            }));
        }
        self.write_frame(frame.as_bytes(), mode)
    }

    fn write_frame(&self, bytes: &[u8], mode: DisplayMode) -> Result<(), DisplayError> {

        let mut panel = self.lock_panel();
        match panel.state {
            PanelState::Ready { partial } => {
                if mode == DisplayMode::Partial && !partial {
                    debug!("partial refresh without partial init");
                }
            }
            PanelState::Uninitialized | PanelState::Asleep => self.init_locked(&mut panel)?,
        }

        let result = panel.driver.execute_with_payload(
            &CommandSequence::new(),
            self.firmware.write_ram_command(),
            bytes,
            &self.firmware.update_sequence(mode),
        );
        if let Err(e) = result {
            // The controller may be mid-refresh; make the next frame re-init.
            panel.state = PanelState::Uninitialized;
            return Err(e.into());
        }
        debug!(bytes = bytes.len(), partial = mode == DisplayMode::Partial, "frame shown");
        Ok(())
    }

    /// Fill the panel with white using a full refresh.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Protocol`] on busy timeout or bus failure.
    pub fn clear(&self) -> Result<(), DisplayError> {
        self.show_frame(&PackedBuffer::white(self.spec()), DisplayMode::Full)
    }

    /// Enter deep sleep. No-op when already asleep or never initialised.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Protocol`] on busy timeout or bus failure.
    pub fn sleep(&self) -> Result<(), DisplayError> {
        let mut panel = self.lock_panel();
        if !matches!(panel.state, PanelState::Ready { .. }) {
            return Ok(());
        }
        panel.driver.execute(&self.firmware.sleep_sequence())?;
        panel.state = PanelState::Asleep;
        info!("panel asleep");
        Ok(())
    }

    /// Pulse the reset line. The controller loses its configuration, so the
    /// next frame runs a full init.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Protocol`] on bus failure.
    pub fn reset(&self) -> Result<(), DisplayError> {
        let mut panel = self.lock_panel();
        panel.state = PanelState::Uninitialized;
        panel.driver.execute(&self.firmware.reset_sequence())?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    /// Convert an encoded image to a frame for this panel, using the cache.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Image`] if decoding or processing fails.
    pub fn process_and_pack(
        &self,
        bytes: &[u8],
        options: &ProcessingOptions,
    ) -> Result<PackedBuffer, DisplayError> {
        self.process_and_pack_with_cancel(bytes, options, &CancelToken::new())
    }

    /// [`process_and_pack`](Self::process_and_pack) that can be abandoned
    /// from another thread before it reaches the panel.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Image`] with [`eink_image::ImageError::Cancelled`] if
    /// `cancel` fires first.
    pub fn process_and_pack_with_cancel(
        &self,
        bytes: &[u8],
        options: &ProcessingOptions,
        cancel: &CancelToken,
    ) -> Result<PackedBuffer, DisplayError> {
        let fingerprint = Fingerprint::new(bytes, options, self.firmware_type());
        self.cache.get_or_compute(fingerprint, || {
            eink_image::process_and_pack_with_cancel(bytes, options, self.spec(), cancel)
                .map_err(DisplayError::from)
        })
    }

    /// Read an image file and convert it, using the cache.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Image`] if the file cannot be read or processed.
    pub fn process_file(
        &self,
        path: impl AsRef<Path>,
        options: &ProcessingOptions,
    ) -> Result<PackedBuffer, DisplayError> {
        let bytes = std::fs::read(path).map_err(eink_image::ImageError::from)?;
        self.process_and_pack(&bytes, options)
    }

    /// Convert and show an encoded image.
    ///
    /// # Errors
    ///
    /// Any error of [`process_and_pack`](Self::process_and_pack) or
    /// [`show`](Self::show). Nothing reaches the panel if processing fails.
    pub fn show_image(
        &self,
        bytes: &[u8],
        options: &ProcessingOptions,
        mode: DisplayMode,
    ) -> Result<(), DisplayError> {
        let frame = self.process_and_pack(bytes, options)?;
        self.show_frame(&frame, mode)
    }

    /// Read, convert and show an image file.
    ///
    /// # Errors
    ///
    /// See [`show_image`](Self::show_image).
    pub fn show_file(
        &self,
        path: impl AsRef<Path>,
        options: &ProcessingOptions,
        mode: DisplayMode,
    ) -> Result<(), DisplayError> {
        let frame = self.process_file(path, options)?;
        self.show_frame(&frame, mode)
    }

    // -----------------------------------------------------------------------
    // Cache
    // -----------------------------------------------------------------------

    /// Drop every cached frame (and truncate the cache file).
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The frame cache.
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Put the panel to sleep and persist the cache.
    ///
    /// Both steps run even if the first fails; the first error is returned.
    ///
    /// # Errors
    ///
    /// [`DisplayError::Protocol`] from sleep or [`DisplayError::Cache`] from
    /// persistence.
    pub fn shutdown(&self) -> Result<(), DisplayError> {
        let slept = self.sleep();
        let persisted = self.cache.persist().map_err(DisplayError::from);
        info!("display shut down");
        slept.and(persisted)
    }
}

impl<B: Bus> Drop for EinkDisplay<B> {
    /// Persist the cache unless nothing changed since the last write
    /// (for example right after [`shutdown`](EinkDisplay::shutdown)).
    fn drop(&mut self) {
        if let Err(e) = self.cache.persist_if_dirty() {
            warn!(error = %e, "cache not persisted on drop");
        }
    }
}

impl<B: Bus> core::fmt::Debug for EinkDisplay<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EinkDisplay")
            .field("firmware", &self.firmware.firmware_type())
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}
