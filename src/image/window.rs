//! A contiguous block of full-width rows cut out of a larger image.
//!
//! Ranks that receive only their span plus a one-row halo hold a
//! `RowWindow`; ranks that receive the whole image hold a window with
//! `first_row == 0` covering every row. Rows are addressed in full-image
//! coordinates in both cases, so the stencil code is oblivious to the
//! distribution mode.
use super::traits::ImageView;
use super::{PixelBuffer, CHANNELS};
use crate::error::{Result, StencilError};
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowWindow {
    width: usize,
    height: usize,
    first_row: usize,
    data: Vec<u8>,
}

impl RowWindow {
    /// `data` must hold a whole number of rows that fit inside `height`.
    pub fn new(width: usize, height: usize, first_row: usize, data: Vec<u8>) -> Result<Self> {
        let rb = width * CHANNELS;
        let rows = if rb == 0 { 0 } else { data.len() / rb };
        let whole_rows = if rb == 0 {
            data.is_empty()
        } else {
            data.len() % rb == 0
        };
        if !whole_rows || (rows > 0 && first_row + rows > height) {
            return Err(StencilError::BufferSize {
                width,
                height: rows,
                expected: rows * rb,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            first_row,
            data,
        })
    }

    /// Window covering every row of `image`.
    pub fn full(image: PixelBuffer) -> Self {
        let (width, height) = image.dims();
        Self {
            width,
            height,
            first_row: 0,
            data: image.into_raw(),
        }
    }

    #[inline]
    pub fn first_row(&self) -> usize {
        self.first_row
    }

    /// Rows held, in full-image coordinates.
    pub fn held_rows(&self) -> Range<usize> {
        let rb = self.row_bytes();
        let rows = if rb == 0 { 0 } else { self.data.len() / rb };
        self.first_row..self.first_row + rows
    }

    /// Copy of the held rows `rows`; panics if any of them is not held.
    pub fn copy_rows(&self, rows: Range<usize>) -> Vec<u8> {
        if rows.start >= rows.end {
            return Vec::new();
        }
        let rb = self.row_bytes();
        let start = (rows.start - self.first_row) * rb;
        let end = (rows.end - self.first_row) * rb;
        self.data[start..end].to_vec()
    }
}

impl ImageView for RowWindow {
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
        let local = y - self.first_row;
        &self.data[local * rb..(local + 1) * rb]
    }
}
