//! Property-based tests for the image pipeline.
//! Any source size with any option combination yields an exact-size frame.

#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
)]

use eink_image::dither::dither;
use eink_image::{
    process_image, CancelToken, DitheringMethod, ProcessingOptions, Rotation, ScalingMethod,
};
use eink_specs::displays::{EPD_122X250, EPD_128X250, EPD_240X416};
use eink_specs::DisplaySpec;
use image::{DynamicImage, GrayImage, Luma};
use proptest::prelude::*;

fn scaling() -> impl Strategy<Value = ScalingMethod> {
    prop_oneof![
        Just(ScalingMethod::Letterbox),
        Just(ScalingMethod::CropCenter),
        Just(ScalingMethod::Stretch),
    ]
}

fn dithering() -> impl Strategy<Value = DitheringMethod> {
    prop_oneof![
        Just(DitheringMethod::None),
        Just(DitheringMethod::Simple),
        Just(DitheringMethod::FloydSteinberg),
        Just(DitheringMethod::Sierra),
        Just(DitheringMethod::Sierra2Row),
        Just(DitheringMethod::SierraLite),
    ]
}

fn rotation() -> impl Strategy<Value = Rotation> {
    prop_oneof![
        Just(Rotation::None),
        Just(Rotation::Rotate90),
        Just(Rotation::Rotate180),
        Just(Rotation::Rotate270),
    ]
}

fn options() -> impl Strategy<Value = ProcessingOptions> {
    (
        scaling(),
        dithering(),
        rotation(),
        any::<(bool, bool, bool)>(),
        proptest::option::of(0u32..500),
        proptest::option::of(0u32..500),
    )
        .prop_map(|(s, d, r, (fh, fv, inv), cx, cy)| {
            ProcessingOptions::default()
                .with_scaling(s)
                .with_dithering(d)
                .with_rotation(r)
                .with_flips(fh, fv)
                .with_crop(cx, cy)
                .with_invert(inv)
        })
}

fn panel() -> impl Strategy<Value = &'static DisplaySpec> {
    prop_oneof![Just(&EPD_128X250), Just(&EPD_122X250), Just(&EPD_240X416)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn frame_always_matches_panel(
        w in 1u32..=300,
        h in 1u32..=300,
        seed in any::<u8>(),
        opts in options(),
        spec in panel(),
    ) {
        let img = GrayImage::from_fn(w, h, |x, y| {
            Luma([(x.wrapping_mul(7) ^ y.wrapping_mul(13)) as u8 ^ seed])
        });
        let frame = process_image(&DynamicImage::ImageLuma8(img), &opts, spec, &CancelToken::new())
            .unwrap();
        prop_assert_eq!(frame.len(), spec.array_size());
        prop_assert_eq!((frame.width(), frame.height()), (spec.width, spec.height));
        prop_assert!(frame.padding_is_white());
    }

    /// Error diffusion never looks back, so each output row depends only on
    /// the rows at or above it.
    #[test]
    fn dithering_rows_ignore_rows_below(
        w in 1u32..=40,
        h in 2u32..=20,
        cut in 1u32..=19,
        method in dithering(),
    ) {
        let cut = cut.min(h - 1);
        let base = GrayImage::from_fn(w, h, |x, y| Luma([((x * 37 + y * 91) % 256) as u8]));
        let mut changed = base.clone();
        for y in cut..h {
            for x in 0..w {
                changed.put_pixel(x, y, Luma([255 - base.get_pixel(x, y)[0]]));
            }
        }
        let a = dither(&base, method, &CancelToken::new()).unwrap();
        let b = dither(&changed, method, &CancelToken::new()).unwrap();
        for y in 0..cut {
            for x in 0..w {
                prop_assert_eq!(a.get(x, y), b.get(x, y));
            }
        }
    }
}
