//! Show an image file on a recording bus and report what was sent.
//!
//! Run with:
//!   RUST_LOG=debug cargo run -p display --example show_image --features mock -- photo.png EPD240x416
//!
//! The second argument (firmware) is optional and defaults to EPD128x250.

use display::{DisplayConfig, DisplayMode, EinkDisplay, ProcessingOptions};
use platform::mocks::{BusOp, MockBus};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        return Err("usage: show_image <image> [firmware]".into());
    };
    let config = match args.next() {
        Some(name) => DisplayConfig::from_firmware_name(&name)?,
        None => DisplayConfig::default(),
    };

    let bus = MockBus::new();
    let display = EinkDisplay::new(bus.clone(), config)?;
    let (width, height) = display.dimensions();
    info!(firmware = display.firmware_type().as_str(), width, height, "panel");

    display.show_file(&path, &ProcessingOptions::default(), DisplayMode::Full)?;
    display.shutdown()?;

    let ops = bus.ops();
    let data = ops.iter().filter(|op| matches!(op, BusOp::Data(_))).count();
    let waits = ops.iter().filter(|op| matches!(op, BusOp::BusyWait(_))).count();
    info!(
        commands = bus.commands().len(),
        data_bytes = data,
        busy_waits = waits,
        frame_bytes = display.spec().array_size(),
        "done"
    );
    Ok(())
}
