//! Waveshare panels

use crate::{Controller, DisplaySpec};

/// Waveshare 2.13" V4 in native (portrait) orientation, 122×250, SSD1680.
///
/// The 122-pixel rows are not byte-aligned: each row takes 16 bytes and the
/// last 6 bits of every row are padding.
pub const EPD_122X250: DisplaySpec = DisplaySpec {
    name: "EPD122x250",
    description: "Waveshare 2.13\" V4 122x250 monochrome e-paper, SSD1680",
    width: 122,
    height: 250,
    controller: Controller::SSD1680,
};
