//! 1-bit pixel matrices and the packed RAM layout
//!
//! The controller RAM format is row-major with each row padded up to a whole
//! byte. Within a byte the leftmost pixel is the most significant bit. A set
//! bit is white, a cleared bit is black, and padding bits are always white.
//!
//! ```text
//!  x:   0 1 2 3 4 5 6 7 | 8 9 ...
//!  bit: 7 6 5 4 3 2 1 0 | 7 6 ...
//!  byte index = y * bytes_per_row + x / 8
//! ```

// Pixel addressing is bounded by the matrix dimensions which are checked
// against the `DisplaySpec` before any byte is touched.
#![allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]

use std::sync::Arc;

use crate::{DisplaySpec, SizeMismatch};

// ---------------------------------------------------------------------------
// BitMatrix
// ---------------------------------------------------------------------------

/// Row-major 1-bit image. `true` is white.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BitMatrix {
    /// Matrix filled with a single color.
    pub fn new(width: u32, height: u32, white: bool) -> Self {
        Self {
            width,
            height,
            bits: vec![white; width as usize * height as usize],
        }
    }

    /// Build a matrix by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at (x, y), `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<bool> {
        self.index(x, y).and_then(|i| self.bits.get(i).copied())
    }

    /// Set a pixel. Out-of-bounds writes are ignored and return `false`.
    pub fn set(&mut self, x: u32, y: u32, white: bool) -> bool {
        match self.index(x, y).and_then(|i| self.bits.get_mut(i)) {
            Some(bit) => {
                *bit = white;
                true
            }
            None => false,
        }
    }

    /// Iterate rows as slices of `width` pixels.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.bits.chunks(self.width.max(1) as usize)
    }

    /// Number of black pixels.
    pub fn count_black(&self) -> usize {
        self.bits.iter().filter(|white| !**white).count()
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}

// ---------------------------------------------------------------------------
// PackedBuffer
// ---------------------------------------------------------------------------

/// A frame in the exact byte layout the panel RAM expects.
///
/// The length is always `DisplaySpec::array_size()` for the panel it was
/// built for. Cloning shares the underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBuffer {
    width: u32,
    height: u32,
    data: Arc<[u8]>,
}

/// Matrix dimensions do not match the target panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("matrix is {actual_width}x{actual_height}, panel needs {width}x{height}")]
pub struct DimensionMismatch {
    /// Panel width
    pub width: u32,
    /// Panel height
    pub height: u32,
    /// Matrix width
    pub actual_width: u32,
    /// Matrix height
    pub actual_height: u32,
}

impl PackedBuffer {
    /// All-white frame.
    pub fn white(spec: &DisplaySpec) -> Self {
        Self {
            width: spec.width,
            height: spec.height,
            data: vec![0xFF; spec.array_size()].into(),
        }
    }

    /// All-black frame. Padding bits stay white.
    pub fn black(spec: &DisplaySpec) -> Self {
        let bpr = spec.bytes_per_row();
        let tail = padding_mask(spec.padding_bits());
        let mut data = vec![0x00; spec.array_size()];
        for row in data.chunks_exact_mut(bpr.max(1)) {
            if let Some(last) = row.last_mut() {
                *last = tail;
            }
        }
        Self {
            width: spec.width,
            height: spec.height,
            data: data.into(),
        }
    }

    /// Wrap raw bytes that are already in panel layout.
    ///
    /// # Errors
    ///
    /// [`SizeMismatch`] when the length is not exactly `spec.array_size()`.
    pub fn from_bytes(spec: &DisplaySpec, bytes: impl Into<Arc<[u8]>>) -> Result<Self, SizeMismatch> {
        let data = bytes.into();
        spec.validate_len(data.len())?;
        Ok(Self {
            width: spec.width,
            height: spec.height,
            data,
        })
    }

    /// Panel width this buffer was packed for
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Panel height this buffer was packed for
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw bytes, ready to stream into the RAM-write data phase.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Byte length (equals the panel's `array_size`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True only for a zero-sized panel.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether this buffer has the geometry of `spec`.
    pub fn fits(&self, spec: &DisplaySpec) -> bool {
        self.width == spec.width && self.height == spec.height && self.len() == spec.array_size()
    }

    /// Logical pixel readback. `Some(true)` is white.
    pub fn pixel(&self, x: u32, y: u32) -> Option<bool> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let byte = self.data.get(self.byte_index(x, y))?;
        Some(byte & bit_mask(x) != 0)
    }

    /// Unpack into a [`BitMatrix`], dropping padding bits.
    pub fn to_bit_matrix(&self) -> BitMatrix {
        BitMatrix::from_fn(self.width, self.height, |x, y| {
            self.pixel(x, y).unwrap_or(true)
        })
    }

    /// True when every padding bit in every row is set.
    pub fn padding_is_white(&self) -> bool {
        let bpr = self.bytes_per_row();
        let pad = (bpr as u32 * 8).saturating_sub(self.width);
        let mask = padding_mask(pad);
        self.data
            .chunks_exact(bpr.max(1))
            .filter_map(|row| row.last())
            .all(|last| last & mask == mask)
    }

    fn bytes_per_row(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    fn byte_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.bytes_per_row() + x as usize / 8
    }
}

impl AsRef<[u8]> for PackedBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

// ---------------------------------------------------------------------------
// Packing
// ---------------------------------------------------------------------------

/// Pack a 1-bit matrix into panel RAM layout.
///
/// The buffer starts all white; black pixels clear their bit. Padding bits
/// are never written.
///
/// # Errors
///
/// [`DimensionMismatch`] when the matrix is not exactly `spec.width` by
/// `spec.height`.
pub fn pack(matrix: &BitMatrix, spec: &DisplaySpec) -> Result<PackedBuffer, DimensionMismatch> {
    if matrix.width() != spec.width || matrix.height() != spec.height {
        return Err(DimensionMismatch {
            width: spec.width,
            height: spec.height,
            actual_width: matrix.width(),
            actual_height: matrix.height(),
        });
    }

    let bpr = spec.bytes_per_row();
    let mut data = vec![0xFF_u8; spec.array_size()];

    for (out_row, in_row) in data.chunks_exact_mut(bpr.max(1)).zip(matrix.rows()) {
        for (x, white) in in_row.iter().enumerate() {
            if !white {
                if let Some(byte) = out_row.get_mut(x / 8) {
                    *byte &= !bit_mask(x as u32);
                }
            }
        }
    }

    Ok(PackedBuffer {
        width: spec.width,
        height: spec.height,
        data: data.into(),
    })
}

#[inline]
const fn bit_mask(x: u32) -> u8 {
    0x80 >> (x % 8)
}

/// Low `bits` bits of the last byte in a row.
#[inline]
const fn padding_mask(bits: u32) -> u8 {
    ((1u16 << bits) - 1) as u8
}
