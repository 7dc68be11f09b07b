//! Supported input formats

use std::path::Path;

/// File extensions the enabled decoders understand (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp", "ico", "pbm", "pgm", "ppm", "pam",
    "tga",
];

/// Same list as [`SUPPORTED_EXTENSIONS`].
pub fn supported_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

/// Whether `path` has a supported extension (case-insensitive).
///
/// Only the name is inspected; decoding still guesses from content.
pub fn is_format_supported(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
