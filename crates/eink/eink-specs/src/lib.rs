//! E-Ink Display Specifications
//!
//! Panel geometry for the supported 1-bit e-ink displays and the packed RAM
//! layout those panels consume.
//!
//! # Features
//!
//! - **Display table** - Pre-configured specs for every supported panel
//! - **Row-padded packing** - `BitMatrix` to controller RAM bytes, MSB first
//! - **Serde support** - Optional serialization of specs for diagnostics
//!
//! # Example
//!
//! ```
//! use eink_specs::displays::EPD_122X250;
//! use eink_specs::{pack, BitMatrix};
//!
//! let spec = EPD_122X250;
//! assert_eq!(spec.bytes_per_row(), 16);
//! assert_eq!(spec.array_size(), 4000);
//!
//! let checker = BitMatrix::from_fn(spec.width, spec.height, |x, y| (x + y) % 2 == 0);
//! let packed = pack(&checker, &spec).unwrap();
//! assert_eq!(packed.len(), spec.array_size());
//! assert!(packed.padding_is_white());
//! ```

mod display_spec;
pub mod displays;
pub mod packed;

pub use display_spec::{Controller, DisplaySpec, SizeMismatch};
pub use packed::{pack, BitMatrix, DimensionMismatch, PackedBuffer};
