//! End-to-end pipeline tests from encoded bytes to packed frames.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use eink_image::{
    process_and_pack, process_and_pack_with_cancel, process_file, CancelToken, DitheringMethod,
    ImageError, ProcessingOptions, Rotation, ScalingMethod,
};
use eink_specs::displays::{EPD_122X250, EPD_128X250, EPD_240X416};
use eink_testing::{fixtures, FrameProbe};

#[test]
fn test_output_length_matches_every_panel() {
    let png = fixtures::gradient_png(300, 200);
    for spec in [&EPD_128X250, &EPD_122X250, &EPD_240X416] {
        let frame = process_and_pack(&png, &ProcessingOptions::default(), spec).unwrap();
        assert_eq!(frame.len(), spec.array_size(), "{}", spec.name);
        FrameProbe::new(&frame).assert_padding_white().unwrap();
    }
}

#[test]
fn test_letterbox_margins_are_white() {
    // Wide black image on a tall panel: bands above and below stay white.
    let png = fixtures::solid_png(400, 100, 0);
    let frame = process_and_pack(&png, &ProcessingOptions::default(), &EPD_128X250).unwrap();
    let probe = FrameProbe::new(&frame);
    probe.assert_region_uniform(0, 0, 128, 40, true).unwrap();
    probe.assert_region_uniform(0, 210, 128, 40, true).unwrap();
    probe.assert_region_uniform(0, 115, 128, 20, false).unwrap();
}

#[test]
fn test_rotation_fits_landscape_source() {
    // 250x128 landscape, left half black. After a 90 degree turn the black
    // half ends up at the top of the portrait frame.
    let img = image::GrayImage::from_fn(250, 128, |x, _| image::Luma([if x < 125 { 0 } else { 255 }]));
    let png = fixtures::encode_png(&image::DynamicImage::ImageLuma8(img));
    let opts = ProcessingOptions::default()
        .with_rotation(Rotation::Rotate90)
        .with_dithering(DitheringMethod::None);

    let frame = process_and_pack(&png, &opts, &EPD_128X250).unwrap();
    let probe = FrameProbe::new(&frame);
    probe.assert_region_uniform(0, 0, 128, 120, false).unwrap();
    probe.assert_region_uniform(0, 130, 128, 120, true).unwrap();
}

#[test]
fn test_transparent_background_is_white() {
    let png = fixtures::alpha_ramp_png(128, 250);
    let opts = ProcessingOptions::default()
        .with_scaling(ScalingMethod::Stretch)
        .with_dithering(DitheringMethod::Simple);
    let frame = process_and_pack(&png, &opts, &EPD_128X250).unwrap();
    let probe = FrameProbe::new(&frame);
    // Fully transparent left column, fully opaque black right column.
    probe.assert_region_uniform(0, 0, 1, 250, true).unwrap();
    probe.assert_region_uniform(127, 0, 1, 250, false).unwrap();
}

#[test]
fn test_mid_gray_dithers_to_mixed_pattern() {
    let png = fixtures::solid_png(128, 250, 128);
    for method in [
        DitheringMethod::FloydSteinberg,
        DitheringMethod::Sierra,
        DitheringMethod::Sierra2Row,
        DitheringMethod::SierraLite,
    ] {
        let opts = ProcessingOptions::default().with_dithering(method);
        let frame = process_and_pack(&png, &opts, &EPD_128X250).unwrap();
        FrameProbe::new(&frame).assert_black_ratio(0.35, 0.65).unwrap();
    }
}

#[test]
fn test_same_input_same_bytes() {
    let png = fixtures::checker_png(200, 300, 7);
    let opts = ProcessingOptions::default().with_dithering(DitheringMethod::Sierra);
    let a = process_and_pack(&png, &opts, &EPD_122X250).unwrap();
    let b = process_and_pack(&png, &opts, &EPD_122X250).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn test_corrupt_bytes_are_decode_errors() {
    let mut png = fixtures::solid_png(10, 10, 0);
    png.truncate(20);
    let err = process_and_pack(&png, &ProcessingOptions::default(), &EPD_128X250).unwrap_err();
    assert!(matches!(err, ImageError::Decode(_)), "{err}");
}

#[test]
fn test_cancel_before_start() {
    let token = CancelToken::new();
    token.cancel();
    let png = fixtures::solid_png(10, 10, 0);
    let result =
        process_and_pack_with_cancel(&png, &ProcessingOptions::default(), &EPD_128X250, &token);
    assert!(matches!(result, Err(ImageError::Cancelled)));
}

#[test]
fn test_process_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("black.png");
    std::fs::write(&path, fixtures::solid_png(64, 64, 0)).unwrap();

    let opts = ProcessingOptions::default().with_scaling(ScalingMethod::Stretch);
    let frame = process_file(&path, &opts, &EPD_240X416).unwrap();
    assert_eq!(FrameProbe::new(&frame).black_count(), 240 * 416);
}
