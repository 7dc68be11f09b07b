//! Cache errors

/// Failures while writing the persistence file.
///
/// Loading never fails: an unreadable file degrades to an empty cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Filesystem failure.
    #[error("cache file I/O: {0}")]
    Io(#[from] std::io::Error),

    /// postcard serialisation failed.
    #[error("cache encode: {0}")]
    Encode(#[from] postcard::Error),
}
