//! Grayscale to 1-bit conversion
//!
//! Error diffusion is forward-only (left to right, top to bottom, no
//! serpentine) in integer arithmetic. Each tap adds `(err * weight) >> shift`
//! where `>>` is an arithmetic shift, so negative errors round toward
//! negative infinity. Output is fully deterministic.

// Offsets are bounds-checked against the image before every write.
#![allow(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use eink_specs::BitMatrix;
use image::GrayImage;

use crate::cancel::CancelToken;
use crate::error::ImageError;
use crate::options::DitheringMethod;

/// Gray levels at or above this become white.
pub const THRESHOLD: i32 = 128;

/// One error diffusion tap: `(dx, dy, weight)`.
type Tap = (i32, u32, i32);

/// Diffusion kernel: taps plus the shift that divides their weights.
struct Kernel {
    taps: &'static [Tap],
    shift: u32,
}

//        X   7
//    3   5   1      (/16)
const FLOYD_STEINBERG: Kernel = Kernel {
    taps: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
    shift: 4,
};

//            X   5   3
//    2   4   5   4   2
//        2   3   2          (/32)
const SIERRA: Kernel = Kernel {
    taps: &[
        (1, 0, 5),
        (2, 0, 3),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 5),
        (1, 1, 4),
        (2, 1, 2),
        (-1, 2, 2),
        (0, 2, 3),
        (1, 2, 2),
    ],
    shift: 5,
};

//            X   4   3
//    1   2   3   2   1      (/16)
const SIERRA_2ROW: Kernel = Kernel {
    taps: &[
        (1, 0, 4),
        (2, 0, 3),
        (-2, 1, 1),
        (-1, 1, 2),
        (0, 1, 3),
        (1, 1, 2),
        (2, 1, 1),
    ],
    shift: 4,
};

//        X   2
//    1   1          (/4)
const SIERRA_LITE: Kernel = Kernel {
    taps: &[(1, 0, 2), (-1, 1, 1), (0, 1, 1)],
    shift: 2,
};

/// Convert `gray` to a 1-bit matrix (`true` = white).
///
/// The token is checked before every row.
///
/// # Errors
///
/// [`ImageError::Cancelled`] if the token fires mid-way.
pub fn dither(
    gray: &GrayImage,
    method: DitheringMethod,
    cancel: &CancelToken,
) -> Result<BitMatrix, ImageError> {
    match method {
        DitheringMethod::None | DitheringMethod::Simple => threshold(gray, cancel),
        DitheringMethod::FloydSteinberg => diffuse(gray, &FLOYD_STEINBERG, cancel),
        DitheringMethod::Sierra => diffuse(gray, &SIERRA, cancel),
        DitheringMethod::Sierra2Row => diffuse(gray, &SIERRA_2ROW, cancel),
        DitheringMethod::SierraLite => diffuse(gray, &SIERRA_LITE, cancel),
    }
}

fn threshold(gray: &GrayImage, cancel: &CancelToken) -> Result<BitMatrix, ImageError> {
    let (w, h) = gray.dimensions();
    let mut out = BitMatrix::new(w, h, true);
    for y in 0..h {
        cancel.check()?;
        for x in 0..w {
            let v = i32::from(gray.get_pixel(x, y).0[0]);
            out.set(x, y, v >= THRESHOLD);
        }
    }
    Ok(out)
}

fn diffuse(gray: &GrayImage, kernel: &Kernel, cancel: &CancelToken) -> Result<BitMatrix, ImageError> {
    let (w, h) = gray.dimensions();
    let width = w as usize;
    let mut buf: Vec<i32> = gray.as_raw().iter().map(|v| i32::from(*v)).collect();
    let mut out = BitMatrix::new(w, h, true);

    for y in 0..h {
        cancel.check()?;
        for x in 0..w {
            let idx = y as usize * width + x as usize;
            let Some(old) = buf.get(idx).copied() else {
                continue;
            };
            let white = old >= THRESHOLD;
            let err = old - if white { 255 } else { 0 };
            out.set(x, y, white);

            for &(dx, dy, weight) in kernel.taps {
                let nx = x as i32 + dx;
                let ny = y + dy;
                if nx < 0 || nx >= w as i32 || ny >= h {
                    continue;
                }
                if let Some(cell) = buf.get_mut(ny as usize * width + nx as usize) {
                    *cell += (err * weight) >> kernel.shift;
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use image::Luma;

    const ALL: [DitheringMethod; 6] = [
        DitheringMethod::None,
        DitheringMethod::Simple,
        DitheringMethod::FloydSteinberg,
        DitheringMethod::Sierra,
        DitheringMethod::Sierra2Row,
        DitheringMethod::SierraLite,
    ];

    fn gradient(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([((x * 255 / (w - 1) + y) % 256) as u8]))
    }

    #[test]
    fn test_threshold_boundary() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([[127, 128, 129][x as usize]]));
        let out = dither(&img, DitheringMethod::Simple, &CancelToken::new()).unwrap();
        assert_eq!(out.get(0, 0), Some(false));
        assert_eq!(out.get(1, 0), Some(true));
        assert_eq!(out.get(2, 0), Some(true));
    }

    #[test]
    fn test_solid_images_stay_solid() {
        let white = GrayImage::from_pixel(17, 9, Luma([255]));
        let black = GrayImage::from_pixel(17, 9, Luma([0]));
        for method in ALL {
            let w = dither(&white, method, &CancelToken::new()).unwrap();
            let b = dither(&black, method, &CancelToken::new()).unwrap();
            assert_eq!(w.count_black(), 0, "{method:?}");
            assert_eq!(b.count_black(), 17 * 9, "{method:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let img = gradient(64, 32);
        for method in ALL {
            let a = dither(&img, method, &CancelToken::new()).unwrap();
            let b = dither(&img, method, &CancelToken::new()).unwrap();
            assert_eq!(a, b, "{method:?}");
        }
    }

    #[test]
    fn test_mid_gray_is_roughly_half_black() {
        let img = GrayImage::from_pixel(64, 64, Luma([128]));
        for method in [
            DitheringMethod::FloydSteinberg,
            DitheringMethod::Sierra,
            DitheringMethod::Sierra2Row,
            DitheringMethod::SierraLite,
        ] {
            let out = dither(&img, method, &CancelToken::new()).unwrap();
            let black = out.count_black();
            assert!((1500..=2600).contains(&black), "{method:?}: {black}");
        }
    }

    #[test]
    fn test_floyd_steinberg_first_taps() {
        // 100 -> black, error 100: right gets 100*7>>4 = 43, so 100+43 = 143 -> white
        let img = GrayImage::from_fn(2, 1, |_, _| Luma([100]));
        let out = dither(&img, DitheringMethod::FloydSteinberg, &CancelToken::new()).unwrap();
        assert_eq!(out.get(0, 0), Some(false));
        assert_eq!(out.get(1, 0), Some(true));
    }

    #[test]
    fn test_negative_error_uses_arithmetic_shift() {
        // 129 -> white, error -126: right gets (-126*2)>>2 = -63, 129-63 = 66 -> black
        let img = GrayImage::from_fn(2, 1, |_, _| Luma([129]));
        let out = dither(&img, DitheringMethod::SierraLite, &CancelToken::new()).unwrap();
        assert_eq!(out.get(0, 0), Some(true));
        assert_eq!(out.get(1, 0), Some(false));
    }

    #[test]
    fn test_cancelled_before_first_row() {
        let token = CancelToken::new();
        token.cancel();
        let img = gradient(8, 8);
        for method in ALL {
            assert!(matches!(dither(&img, method, &token), Err(ImageError::Cancelled)));
        }
    }
}
