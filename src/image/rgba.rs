//! Owned RGBA8 raster in row-major layout (no padding between rows).
//!
//! Row `y` spans bytes `[y * width * 4, (y + 1) * width * 4)`. The length
//! invariant `data.len() == width * height * 4` is checked on construction
//! from raw bytes and preserved by every method.
use super::traits::{ImageView, ImageViewMut};
use super::CHANNELS;
use crate::error::{Result, StencilError};
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Transparent black buffer of size `width × height`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * CHANNELS],
        }
    }

    /// Buffer where every pixel equals `px`.
    pub fn filled(width: usize, height: usize, px: [u8; CHANNELS]) -> Self {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for _ in 0..width * height {
            data.extend_from_slice(&px);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGBA bytes, rejecting a length that does not match the shape.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width * height * CHANNELS;
        if data.len() != expected {
            return Err(StencilError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> [u8; CHANNELS],
    ) -> Self {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Bytes of the contiguous rows `rows` (half-open, clamped to the image).
    pub fn rows_bytes(&self, rows: Range<usize>) -> &[u8] {
        let end = rows.end.min(self.height);
        let start = rows.start.min(end);
        let rb = self.row_bytes();
        &self.data[start * rb..end * rb]
    }

    /// `Err(Dimension)` when no pixel has a full 3×3 neighbourhood.
    ///
    /// Filtering such an image is a no-op; callers use this to report it.
    pub fn require_interior(&self) -> Result<()> {
        if self.has_interior() {
            Ok(())
        } else {
            Err(StencilError::Dimension {
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl ImageView for PixelBuffer {
    #[inline]
    fn width(&self) -> usize {
        self.width
    }
    #[inline]
    fn height(&self) -> usize {
        self.height
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let rb = self.row_bytes();
        &self.data[y * rb..(y + 1) * rb]
    }
}

impl ImageViewMut for PixelBuffer {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let rb = self.row_bytes();
        &mut self.data[y * rb..(y + 1) * rb]
    }
}
