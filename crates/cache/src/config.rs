//! Cache configuration

use std::path::PathBuf;

/// Default number of cached frames.
pub const DEFAULT_CAPACITY: usize = 100;

/// How big the cache is and where it persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries. `0` disables storage; concurrent callers
    /// for one fingerprint still share a single computation.
    pub capacity: usize,
    /// File loaded at startup and written by [`crate::ImageCache::persist`].
    pub persist_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            persist_path: None,
        }
    }
}

impl CacheConfig {
    /// In-memory cache with `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Enable persistence at `path`.
    #[must_use]
    pub fn with_persist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(path.into());
        self
    }
}
