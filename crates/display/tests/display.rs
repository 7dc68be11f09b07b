//! `EinkDisplay` against a recording bus.

#![allow(clippy::unwrap_used, clippy::panic, clippy::arithmetic_side_effects)]

use std::thread;

use display::{
    DisplayConfig, DisplayError, DisplayMode, EinkDisplay, FirmwareType, PackedBuffer, PanelState,
    ProcessingOptions,
};
use eink_image::ImageError;
use eink_protocol::ProtocolError;
use eink_testing::fixtures;
use platform::mocks::{BusOp, MockBus};

const SOFT_RESET: u8 = 0x12;
const DEEP_SLEEP: u8 = 0x10;
const WRITE_RAM: u8 = 0x24;
const UPDATE_CTRL2: u8 = 0x22;
const MASTER_ACTIVATION: u8 = 0x20;

fn open(firmware: FirmwareType) -> (EinkDisplay<MockBus>, MockBus) {
    let bus = MockBus::new();
    let display = EinkDisplay::new(bus.clone(), DisplayConfig::new(firmware)).unwrap();
    (display, bus)
}

#[test]
fn first_frame_runs_init_once() {
    let (display, bus) = open(FirmwareType::Epd128x250);
    assert_eq!(display.state(), PanelState::Uninitialized);
    assert!(bus.ops().is_empty(), "opening must not touch the panel");

    let frame = PackedBuffer::black(display.spec());
    display.show(&frame, DisplayMode::Full).unwrap();
    display.show(&frame, DisplayMode::Full).unwrap();

    assert_eq!(bus.ops().first(), Some(&BusOp::Reset));
    assert_eq!(bus.count_command(SOFT_RESET), 1);
    assert_eq!(bus.count_command(WRITE_RAM), 2);
    assert_eq!(bus.data_after(WRITE_RAM), vec![0x00; 4000]);
    assert_eq!(bus.data_after(UPDATE_CTRL2), vec![0xF7]);
    assert_eq!(bus.commands().last(), Some(&MASTER_ACTIVATION));
    assert!(display.is_initialized());
}

#[test]
fn raw_slices_are_accepted_at_exact_length() {
    let (display, bus) = open(FirmwareType::Epd122x250);
    let raw = vec![0xAA; 4000];
    display.show(raw.as_slice(), DisplayMode::Full).unwrap();
    assert_eq!(bus.data_after(WRITE_RAM), raw);
}

#[test]
fn wrong_length_never_reaches_the_bus() {
    let (display, bus) = open(FirmwareType::Epd240x416);
    for len in [12_479, 12_481, 0] {
        let err = display.show(vec![0xFF; len], DisplayMode::Full).unwrap_err();
        match err {
            DisplayError::SizeMismatch(e) => {
                assert_eq!(e.expected, 12_480);
                assert_eq!(e.actual, len);
            }
            other => panic!("unexpected {other}"),
        }
    }
    assert!(bus.ops().is_empty());
}

#[test]
fn frame_for_other_geometry_is_rejected() {
    // 122x250 and 128x250 both pack to 4000 bytes.
    let (display, bus) = open(FirmwareType::Epd128x250);
    let foreign = PackedBuffer::black(FirmwareType::Epd122x250.spec());
    assert_eq!(foreign.len(), display.spec().array_size());

    let err = display.show_frame(&foreign, DisplayMode::Full).unwrap_err();
    match err {
        DisplayError::Dimensions(e) => {
            assert_eq!((e.width, e.actual_width), (128, 122));
            assert_eq!((e.height, e.actual_height), (250, 250));
        }
        other => panic!("unexpected {other}"),
    }
    assert!(bus.ops().is_empty());

    display
        .show_frame(&PackedBuffer::black(display.spec()), DisplayMode::Full)
        .unwrap();
    assert_eq!(bus.count_command(WRITE_RAM), 1);
}

#[test]
fn sleep_then_show_wakes_with_full_init() {
    let (display, bus) = open(FirmwareType::Epd128x250);

    // Never initialised: nothing to put to sleep.
    display.sleep().unwrap();
    assert!(bus.ops().is_empty());

    display.clear().unwrap();
    display.sleep().unwrap();
    display.sleep().unwrap();
    assert_eq!(display.state(), PanelState::Asleep);
    assert_eq!(bus.count_command(DEEP_SLEEP), 1);
    assert_eq!(bus.data_after(DEEP_SLEEP), vec![0x01]);

    display.clear().unwrap();
    assert_eq!(bus.count_command(SOFT_RESET), 2);
    assert!(display.is_initialized());
}

#[test]
fn busy_timeout_surfaces_and_forces_reinit() {
    let bus = MockBus::new();
    let config = DisplayConfig::new(FirmwareType::Epd128x250).with_busy_timeout_ms(250);
    let display = EinkDisplay::new(bus.clone(), config).unwrap();
    display.init().unwrap();

    bus.script_busy([false]);
    let err = display.clear().unwrap_err();
    assert!(err.is_hardware());
    assert!(matches!(
        err,
        DisplayError::Protocol(ProtocolError::HardwareTimeout { timeout_ms: 250 })
    ));
    assert_eq!(display.state(), PanelState::Uninitialized);

    display.clear().unwrap();
    assert_eq!(bus.count_command(SOFT_RESET), 2);
}

#[test]
fn bus_failure_is_a_protocol_error() {
    let (display, bus) = open(FirmwareType::Epd122x250);
    bus.fail_after(3);
    let err = display.init().unwrap_err();
    assert!(matches!(err, DisplayError::Protocol(ProtocolError::Bus(_))), "{err}");
    assert!(!display.is_initialized());
}

#[test]
fn partial_mode_uses_partial_flags() {
    let (display, bus) = open(FirmwareType::Epd128x250);
    display.init_partial().unwrap();
    assert_eq!(display.state(), PanelState::Ready { partial: true });
    assert_eq!(bus.count_command(SOFT_RESET), 1);

    display
        .show(PackedBuffer::white(display.spec()), DisplayMode::Partial)
        .unwrap();
    assert_eq!(bus.data_after(UPDATE_CTRL2), vec![0xFF]);
}

#[test]
fn partial_refresh_without_partial_init_is_sent() {
    let (display, bus) = open(FirmwareType::Epd240x416);
    display
        .show(PackedBuffer::white(display.spec()), DisplayMode::Partial)
        .unwrap();
    assert_eq!(bus.data_after(UPDATE_CTRL2), vec![0xFC]);
    assert_eq!(display.state(), PanelState::Ready { partial: false });
}

#[test]
fn reset_forgets_initialisation() {
    let (display, bus) = open(FirmwareType::Epd128x250);
    display.init().unwrap();
    bus.clear();

    display.reset().unwrap();
    assert_eq!(bus.ops().first(), Some(&BusOp::Reset));
    assert_eq!(display.state(), PanelState::Uninitialized);
}

#[test]
fn show_image_hits_the_cache_second_time() {
    let (display, bus) = open(FirmwareType::Epd122x250);
    let png = fixtures::gradient_png(200, 100);
    let opts = ProcessingOptions::default();

    display.show_image(&png, &opts, DisplayMode::Full).unwrap();
    let first = bus.data_after(WRITE_RAM);
    display.show_image(&png, &opts, DisplayMode::Full).unwrap();

    assert_eq!(bus.data_after(WRITE_RAM), first);
    let stats = display.cache_stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    assert_eq!(stats.total_bytes, 4000);

    display.clear_cache();
    assert_eq!(display.cache_stats().entries, 0);
}

#[test]
fn options_are_part_of_the_cache_key() {
    let (display, _bus) = open(FirmwareType::Epd128x250);
    let png = fixtures::checker_png(64, 64, 4);
    let a = display
        .process_and_pack(&png, &ProcessingOptions::default())
        .unwrap();
    let b = display
        .process_and_pack(&png, &ProcessingOptions::default().with_invert(true))
        .unwrap();
    assert_ne!(a.as_bytes(), b.as_bytes());
    assert_eq!(display.cache_stats().entries, 2);
}

#[test]
fn undecodable_image_never_reaches_the_bus() {
    let (display, bus) = open(FirmwareType::Epd128x250);
    let err = display
        .show_image(b"definitely not an image", &ProcessingOptions::default(), DisplayMode::Full)
        .unwrap_err();
    assert!(matches!(err, DisplayError::Image(ImageError::Decode(_))), "{err}");
    assert!(bus.ops().is_empty());
    assert_eq!(display.cache_stats().entries, 0);
}

#[test]
fn process_file_and_show_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solid.png");
    std::fs::write(&path, fixtures::solid_png(30, 30, 0)).unwrap();

    let (display, bus) = open(FirmwareType::Epd240x416);
    let opts = ProcessingOptions::default().with_scaling(display::ScalingMethod::Stretch);
    let frame = display.process_file(&path, &opts).unwrap();
    assert!(frame.as_bytes().iter().all(|&b| b == 0x00));

    display.show_file(&path, &opts, DisplayMode::Full).unwrap();
    assert_eq!(bus.data_after(WRITE_RAM).len(), 12_480);

    let missing = display.process_file(dir.path().join("missing.png"), &opts).unwrap_err();
    assert!(matches!(missing, DisplayError::Image(ImageError::Io(_))));
}

#[test]
fn concurrent_callers_share_one_init() {
    let (display, bus) = open(FirmwareType::Epd128x250);
    let images: Vec<Vec<u8>> = (0..4u32).map(|n| fixtures::checker_png(40, 40, n + 1)).collect();

    thread::scope(|s| {
        for png in &images {
            let display = &display;
            s.spawn(move || {
                display
                    .show_image(png, &ProcessingOptions::default(), DisplayMode::Full)
                    .unwrap();
            });
        }
    });

    assert_eq!(bus.count_command(SOFT_RESET), 1);
    assert_eq!(bus.count_command(WRITE_RAM), 4);
    assert_eq!(display.cache_stats().entries, 4);
}

#[test]
fn shutdown_persists_and_reopen_loads() {
    let dir = tempfile::tempdir().unwrap();
    let config = DisplayConfig::new(FirmwareType::Epd122x250)
        .with_cache_persist_path(dir.path().join("frames.bin"));
    let png = fixtures::gradient_png(50, 50);

    let bus = MockBus::new();
    {
        let display = EinkDisplay::new(bus.clone(), config.clone()).unwrap();
        display
            .show_image(&png, &ProcessingOptions::default(), DisplayMode::Full)
            .unwrap();
        display.shutdown().unwrap();
        assert_eq!(display.state(), PanelState::Asleep);
    }
    assert_eq!(bus.count_command(DEEP_SLEEP), 1);

    let reopened = EinkDisplay::new(MockBus::new(), config).unwrap();
    assert!(reopened.cache_stats().persistence_enabled);
    reopened
        .process_and_pack(&png, &ProcessingOptions::default())
        .unwrap();
    let stats = reopened.cache_stats();
    assert_eq!((stats.hits, stats.misses), (1, 0));
}

#[test]
fn other_firmware_does_not_share_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frames.bin");
    let png = fixtures::gradient_png(50, 50);

    {
        let config = DisplayConfig::new(FirmwareType::Epd128x250).with_cache_persist_path(&path);
        let display = EinkDisplay::new(MockBus::new(), config).unwrap();
        display.process_and_pack(&png, &ProcessingOptions::default()).unwrap();
    }

    let config = DisplayConfig::new(FirmwareType::Epd240x416).with_cache_persist_path(&path);
    let display = EinkDisplay::new(MockBus::new(), config).unwrap();
    let frame = display.process_and_pack(&png, &ProcessingOptions::default()).unwrap();
    assert_eq!(frame.len(), 12_480);
    assert_eq!(display.cache_stats().misses, 1);
}

#[test]
fn invalid_config_is_rejected() {
    let err = EinkDisplay::new(MockBus::new(), DisplayConfig::default().with_busy_timeout_ms(0))
        .unwrap_err();
    assert!(matches!(err, DisplayError::Config(_)));
}

#[test]
fn drop_after_shutdown_does_not_rewrite_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frames.bin");
    let config = DisplayConfig::new(FirmwareType::Epd128x250).with_cache_persist_path(&path);

    let display = EinkDisplay::new(MockBus::new(), config.clone()).unwrap();
    display
        .process_and_pack(&fixtures::gradient_png(20, 20), &ProcessingOptions::default())
        .unwrap();
    display.shutdown().unwrap();
    std::fs::remove_file(&path).unwrap();
    drop(display);
    assert!(!path.exists(), "unchanged cache was written again on drop");

    // Changes made after shutdown still reach the file on drop.
    let display = EinkDisplay::new(MockBus::new(), config).unwrap();
    display
        .process_and_pack(&fixtures::checker_png(20, 20, 2), &ProcessingOptions::default())
        .unwrap();
    display.shutdown().unwrap();
    display
        .process_and_pack(&fixtures::solid_png(20, 20, 0), &ProcessingOptions::default())
        .unwrap();
    drop(display);

    let config = DisplayConfig::new(FirmwareType::Epd128x250).with_cache_persist_path(&path);
    let reopened = EinkDisplay::new(MockBus::new(), config).unwrap();
    assert_eq!(reopened.cache_stats().entries, 2);
}
