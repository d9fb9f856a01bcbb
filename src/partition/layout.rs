//! Row → byte offset mapping and the gather plan derived from it.
//!
//! Both the rows a rank owns and the bytes it sends back to the coordinator
//! come from [`RowLayout::byte_range`] applied to the same
//! [`RangePartitioner`] span, so the two can never drift apart. The
//! fixed-chunk mode keeps the equal-size gather of the classic protocol and
//! is accepted only when every span maps to exactly its fixed chunk.
use super::range::{RangePartitioner, WorkerRange};
use crate::error::{Result, StencilError};
use crate::image::CHANNELS;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowLayout {
    width: usize,
    height: usize,
}

impl RowLayout {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width * CHANNELS
    }

    #[inline]
    pub fn total_bytes(&self) -> usize {
        self.row_bytes() * self.height
    }

    /// First byte of row `y`.
    #[inline]
    pub fn row_offset(&self, y: usize) -> usize {
        y * self.row_bytes()
    }

    /// Bytes covered by `rows`; empty for an empty or inverted range.
    pub fn byte_range(&self, rows: WorkerRange) -> Range<usize> {
        if rows.is_empty() {
            let at = self.row_offset(rows.start.min(self.height));
            return at..at;
        }
        self.row_offset(rows.start)..self.row_offset(rows.end)
    }
}

/// How the coordinator sizes the slices it gathers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatherMode {
    /// Each rank sends exactly the bytes of its span.
    #[default]
    Spans,
    /// Each rank sends `total_bytes / workers` bytes.
    FixedChunks,
}

/// Per-rank byte slices of the gathered output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatherPlan {
    layout: RowLayout,
    partitioner: RangePartitioner,
    mode: GatherMode,
}

impl GatherPlan {
    /// Row partitioner and layout must describe the same image.
    pub fn new(layout: RowLayout, partitioner: RangePartitioner, mode: GatherMode) -> Result<Self> {
        if partitioner.extent() != layout.height {
            return Err(StencilError::Partition(format!(
                "partitioner covers {} rows, image has {}",
                partitioner.extent(),
                layout.height
            )));
        }
        let plan = Self {
            layout,
            partitioner,
            mode,
        };
        if mode == GatherMode::FixedChunks {
            plan.check_fixed_chunks()?;
        }
        Ok(plan)
    }

    fn check_fixed_chunks(&self) -> Result<()> {
        let total = self.layout.total_bytes();
        let workers = self.partitioner.workers();
        if total % workers != 0 {
            return Err(StencilError::Partition(format!(
                "buffer of {total} bytes is not divisible by {workers} workers"
            )));
        }
        let chunk = total / workers;
        for rank in 0..workers {
            let owned = self.layout.byte_range(self.partitioner.span(rank));
            let fixed = rank * chunk..(rank + 1) * chunk;
            if owned != fixed {
                return Err(StencilError::Partition(format!(
                    "rank {rank} owns bytes {owned:?} but a fixed gather would take {fixed:?} \
                     ({} rows over {workers} workers)",
                    self.layout.height
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn mode(&self) -> GatherMode {
        self.mode
    }

    #[inline]
    pub fn layout(&self) -> RowLayout {
        self.layout
    }

    #[inline]
    pub fn partitioner(&self) -> RangePartitioner {
        self.partitioner
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.partitioner.workers()
    }

    /// Bytes of the gathered buffer that come from `rank`.
    pub fn slice_range(&self, rank: usize) -> Range<usize> {
        self.layout.byte_range(self.partitioner.span(rank))
    }

    #[inline]
    pub fn slice_len(&self, rank: usize) -> usize {
        self.slice_range(rank).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_map_to_contiguous_bytes() {
        let layout = RowLayout::new(3, 10);
        let plan = GatherPlan::new(
            layout,
            RangePartitioner::new(10, 4).unwrap(),
            GatherMode::Spans,
        )
        .unwrap();
        let mut next = 0;
        for rank in 0..4 {
            let r = plan.slice_range(rank);
            assert_eq!(r.start, next);
            next = r.end;
        }
        assert_eq!(next, layout.total_bytes());
        assert_eq!(plan.slice_len(3), 4 * 12);
    }

    #[test]
    fn fixed_chunks_accept_divisible_heights() {
        let plan = GatherPlan::new(
            RowLayout::new(5, 12),
            RangePartitioner::new(12, 4).unwrap(),
            GatherMode::FixedChunks,
        )
        .unwrap();
        assert_eq!(plan.slice_len(0), plan.slice_len(3));
    }

    #[test]
    fn fixed_chunks_reject_remainder_rows() {
        // 160 bytes split into 40-byte chunks, but rows are 16 bytes wide.
        let err = GatherPlan::new(
            RowLayout::new(4, 10),
            RangePartitioner::new(10, 4).unwrap(),
            GatherMode::FixedChunks,
        )
        .unwrap_err();
        assert!(matches!(err, StencilError::Partition(_)));

        let err = GatherPlan::new(
            RowLayout::new(1, 7),
            RangePartitioner::new(7, 3).unwrap(),
            GatherMode::FixedChunks,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not divisible"));
    }

    #[test]
    fn mismatched_extent_is_rejected() {
        assert!(GatherPlan::new(
            RowLayout::new(4, 10),
            RangePartitioner::new(9, 1).unwrap(),
            GatherMode::Spans,
        )
        .is_err());
    }
}
