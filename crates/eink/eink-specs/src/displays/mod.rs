//! Pre-configured display specifications
//!
//! One entry per supported panel variant. Each firmware variant owns exactly
//! one of these.

pub mod gooddisplay;
pub mod waveshare;

pub use gooddisplay::*;
pub use waveshare::*;

use crate::DisplaySpec;

/// Every panel this crate knows about.
pub const ALL: [&DisplaySpec; 3] = [&EPD_128X250, &EPD_122X250, &EPD_240X416];

/// Look up a built-in panel by its [`DisplaySpec::name`] (case-insensitive).
pub fn by_name(name: &str) -> Option<&'static DisplaySpec> {
    ALL.iter()
        .copied()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}
