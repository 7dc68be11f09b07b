//! Image transform pipeline for 1-bit e-ink panels
//!
//! Turns encoded image bytes into a [`PackedBuffer`](eink_specs::PackedBuffer)
//! that matches a panel's RAM layout exactly.
//!
//! # Example
//!
//! ```no_run
//! use eink_image::{process_file, DitheringMethod, ProcessingOptions, Rotation};
//! use eink_specs::displays::EPD_128X250;
//!
//! let options = ProcessingOptions::default()
//!     .with_dithering(DitheringMethod::Sierra)
//!     .with_rotation(Rotation::Rotate90);
//! let frame = process_file("photo.jpg", &options, &EPD_128X250).unwrap();
//! assert_eq!(frame.len(), EPD_128X250.array_size());
//! ```

#![warn(missing_docs)]

mod cancel;
pub mod decode;
pub mod dither;
mod error;
mod formats;
mod options;
mod pipeline;
pub mod transform;

pub use cancel::CancelToken;
pub use error::ImageError;
pub use formats::{is_format_supported, supported_extensions, SUPPORTED_EXTENSIONS};
pub use options::{DitheringMethod, ProcessingOptions, Rotation, ScalingMethod};
pub use pipeline::{process_and_pack, process_and_pack_with_cancel, process_file, process_image};
