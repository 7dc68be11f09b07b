//! Image pipeline errors

/// Failure anywhere between raw bytes and a packed frame.
///
/// No variant ever carries a partial buffer.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Bytes could not be decoded as any enabled format.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// A transform stage rejected its input.
    #[error("{stage} failed: {cause}")]
    Processing {
        /// Stage name (`"orient"`, `"scale"`, `"dither"`, `"pack"`)
        stage: &'static str,
        /// Human readable cause
        cause: String,
    },

    /// The caller cancelled processing.
    #[error("image processing cancelled")]
    Cancelled,

    /// Reading the source file failed.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageError {
    pub(crate) fn processing(stage: &'static str, cause: impl Into<String>) -> Self {
        Self::Processing {
            stage,
            cause: cause.into(),
        }
    }
}
