//! Packed frame cache
//!
//! Maps a [`Fingerprint`] (source content, processing options, firmware) to
//! a finished [`eink_specs::PackedBuffer`], so showing the same image twice
//! skips decode and dithering.
//!
//! ```
//! use cache::{CacheConfig, Fingerprint, ImageCache};
//! use eink_image::ProcessingOptions;
//! use eink_protocol::FirmwareType;
//! use eink_specs::PackedBuffer;
//!
//! let cache = ImageCache::new(CacheConfig::with_capacity(8));
//! let fw = FirmwareType::Epd122x250;
//! let key = Fingerprint::new(b"png bytes", &ProcessingOptions::default(), fw);
//!
//! let frame = cache
//!     .get_or_compute(key, || Ok::<_, std::convert::Infallible>(PackedBuffer::white(fw.spec())))
//!     .unwrap();
//! assert_eq!(frame.len(), 4000);
//! assert_eq!(cache.stats().entries, 1);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod fingerprint;
mod persist;
mod store;

pub use config::{CacheConfig, DEFAULT_CAPACITY};
pub use error::CacheError;
pub use fingerprint::Fingerprint;
pub use store::{CacheEntry, CacheStats, ImageCache};
