//! Applies a [`GradientKernel`] over an assigned interior region.
//!
//! Neighbours are always read from the input view and results written to a
//! separate output, so the value of a pixel never depends on the order in
//! which pixels, rows or workers are processed. Pixels outside the interior
//! and outside the assigned interval are left untouched; outputs are expected
//! to start as a copy of the input so borders come through unchanged.
use super::kernel::GradientKernel;
use crate::image::{ImageView, PixelBuffer, CHANNELS};
use crate::partition::WorkerRange;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StencilFilter {
    kernel: GradientKernel,
}

impl StencilFilter {
    pub fn new(kernel: GradientKernel) -> Self {
        Self { kernel }
    }

    pub fn sobel() -> Self {
        Self::new(GradientKernel::SOBEL)
    }

    pub fn kernel(&self) -> &GradientKernel {
        &self.kernel
    }

    /// Interior rows `[1, height - 1)` of `input`.
    #[inline]
    fn interior_rows<I: ImageView>(input: &I) -> WorkerRange {
        WorkerRange::new(1, input.height().saturating_sub(1))
    }

    #[inline]
    fn interior_cols<I: ImageView>(input: &I) -> WorkerRange {
        WorkerRange::new(1, input.width().saturating_sub(1))
    }

    /// Filter rows `rows` of `input` into `out`.
    ///
    /// `out` holds whole rows of the output starting at row `out_first_row`
    /// and must contain every row of `rows` that lies in the interior.
    /// Returns the number of pixels written.
    pub fn filter_rows<I: ImageView>(
        &self,
        input: &I,
        rows: WorkerRange,
        out: &mut [u8],
        out_first_row: usize,
    ) -> usize {
        if !input.has_interior() {
            return 0;
        }
        let rows = rows.intersect(Self::interior_rows(input));
        let cols = Self::interior_cols(input);
        let rb = input.row_bytes();
        let mut written = 0;
        for y in rows.iter() {
            let local = (y - out_first_row) * rb;
            let out_row = &mut out[local..local + rb];
            for x in cols.iter() {
                let px = self.kernel.response(input, x, y);
                out_row[x * CHANNELS..(x + 1) * CHANNELS].copy_from_slice(&px);
                written += 1;
            }
        }
        written
    }

    /// Filter columns `cols` over every interior row.
    ///
    /// `band[i]` is the output segment of interior row `i + 1` covering the
    /// columns `[band_first_col, band_first_col + segment_len / 4)`.
    /// Returns the number of pixels written.
    pub fn filter_column_band<I: ImageView>(
        &self,
        input: &I,
        cols: WorkerRange,
        band: &mut [&mut [u8]],
        band_first_col: usize,
    ) -> usize {
        if !input.has_interior() {
            return 0;
        }
        let cols = cols.intersect(Self::interior_cols(input));
        let mut written = 0;
        for (y, segment) in Self::interior_rows(input).iter().zip(band.iter_mut()) {
            for x in cols.iter() {
                let px = self.kernel.response(input, x, y);
                let local = (x - band_first_col) * CHANNELS;
                segment[local..local + CHANNELS].copy_from_slice(&px);
                written += 1;
            }
        }
        written
    }

    /// Sequential reference: filter every interior pixel of `input`.
    pub fn apply(&self, input: &PixelBuffer) -> PixelBuffer {
        let mut out = input.clone();
        let rows = Self::interior_rows(input);
        self.filter_rows(input, rows, out.as_bytes_mut(), 0);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageViewMut;

    fn ramp(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            [(x * 13 + y * 7) as u8, (x * x) as u8, (y * 31) as u8, 255]
        })
    }

    #[test]
    fn rows_outside_the_assignment_are_untouched() {
        let input = ramp(6, 8);
        let filter = StencilFilter::sobel();
        let reference = filter.apply(&input);

        let mut out = input.clone();
        let written = filter.filter_rows(&input, WorkerRange::new(3, 5), out.as_bytes_mut(), 0);
        assert_eq!(written, 2 * 4);
        for y in 0..8 {
            let expected = if (3..5).contains(&y) {
                reference.row(y)
            } else {
                input.row(y)
            };
            assert_eq!(out.row(y), expected, "row {y}");
        }
    }

    #[test]
    fn offset_output_matches_full_output() {
        let input = ramp(5, 9);
        let filter = StencilFilter::sobel();
        let reference = filter.apply(&input);

        let mut slice = input.rows_bytes(4..7).to_vec();
        filter.filter_rows(&input, WorkerRange::new(4, 7), &mut slice, 4);
        assert_eq!(slice, reference.rows_bytes(4..7));
    }

    #[test]
    fn column_band_matches_reference() {
        let input = ramp(7, 5);
        let filter = StencilFilter::sobel();
        let reference = filter.apply(&input);

        let mut out = input.clone();
        let (first, last) = (2, 5);
        let mut segments: Vec<Vec<u8>> = (1..4)
            .map(|y| out.row(y)[first * CHANNELS..last * CHANNELS].to_vec())
            .collect();
        let mut band: Vec<&mut [u8]> = segments.iter_mut().map(|s| s.as_mut_slice()).collect();
        let written =
            filter.filter_column_band(&input, WorkerRange::new(first, last), &mut band, first);
        assert_eq!(written, 3 * 3);
        for (i, seg) in segments.iter().enumerate() {
            let y = i + 1;
            out.row_mut(y)[first * CHANNELS..last * CHANNELS].copy_from_slice(seg);
            assert_eq!(
                &out.row(y)[first * CHANNELS..last * CHANNELS],
                &reference.row(y)[first * CHANNELS..last * CHANNELS]
            );
        }
    }

    #[test]
    fn inverted_range_writes_nothing() {
        let input = ramp(4, 4);
        let mut out = input.clone();
        let n = StencilFilter::sobel().filter_rows(
            &input,
            WorkerRange::new(3, 1),
            out.as_bytes_mut(),
            0,
        );
        assert_eq!(n, 0);
        assert_eq!(out, input);
    }

    #[test]
    fn tiny_image_is_a_no_op() {
        let input = ramp(2, 7);
        assert_eq!(StencilFilter::sobel().apply(&input), input);
    }
}
