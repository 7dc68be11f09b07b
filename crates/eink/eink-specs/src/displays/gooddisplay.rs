//! Good Display panels

use crate::{Controller, DisplaySpec};

/// 2.13" 128×250 panel with SSD1680 controller.
///
/// Byte-aligned width: 16 bytes per row, no padding bits, 4000-byte frame.
pub const EPD_128X250: DisplaySpec = DisplaySpec {
    name: "EPD128x250",
    description: "2.13\" 128x250 monochrome e-paper, SSD1680",
    width: 128,
    height: 250,
    controller: Controller::SSD1680,
};

/// 3.7" 240×416 panel with SSD1677 controller.
///
/// 30 bytes per row, 12 480-byte frame.
pub const EPD_240X416: DisplaySpec = DisplaySpec {
    name: "EPD240x416",
    description: "3.7\" 240x416 monochrome e-paper, SSD1677",
    width: 240,
    height: 416,
    controller: Controller::SSD1677,
};
