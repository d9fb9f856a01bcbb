use crate::error::{Result, StencilError};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Dimension along which work is split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Rows,
    Columns,
}

impl Axis {
    /// Number of rows or columns of a `width × height` image along this axis.
    pub fn extent(self, width: usize, height: usize) -> usize {
        match self {
            Axis::Rows => height,
            Axis::Columns => width,
        }
    }
}

/// Half-open interval `[start, end)` of rows or columns.
///
/// `start >= end` is an empty range, not an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRange {
    pub start: usize,
    pub end: usize,
}

impl WorkerRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        self.start <= i && i < self.end
    }

    /// Indices in the range; yields nothing for an inverted range.
    #[inline]
    pub fn iter(&self) -> Range<usize> {
        self.start..self.end.max(self.start)
    }

    pub fn intersect(&self, other: WorkerRange) -> WorkerRange {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end).max(start);
        WorkerRange { start, end }
    }
}

/// Static split of `extent` rows (or columns) across `workers`.
///
/// `chunk = extent / workers`. Worker `i` owns the *span*
/// `[i * chunk, (i + 1) * chunk)`, except the last worker whose span runs to
/// `extent`. It computes the *range* `span ∩ [1, extent - 1)`: the first
/// index and the last one never have a full neighbourhood. Spans tile
/// `[0, extent)`; ranges tile the interior `[1, extent - 2]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangePartitioner {
    extent: usize,
    workers: usize,
}

impl RangePartitioner {
    pub fn new(extent: usize, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(StencilError::Partition(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(Self { extent, workers })
    }

    pub fn for_axis(axis: Axis, width: usize, height: usize, workers: usize) -> Result<Self> {
        Self::new(axis.extent(width, height), workers)
    }

    #[inline]
    pub fn extent(&self) -> usize {
        self.extent
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Indices per worker before the last worker absorbs the remainder.
    #[inline]
    pub fn chunk(&self) -> usize {
        self.extent / self.workers
    }

    #[inline]
    fn is_last(&self, index: usize) -> bool {
        index + 1 == self.workers
    }

    /// Interior indices computed by worker `index`.
    pub fn range(&self, index: usize) -> WorkerRange {
        debug_assert!(index < self.workers);
        let chunk = self.chunk();
        let mut start = index * chunk;
        let mut end = start + chunk;
        if start == 0 {
            start = 1;
        }
        if self.is_last(index) {
            end = self.extent.saturating_sub(1);
        }
        WorkerRange { start, end }
    }

    /// Indices owned (and gathered) by worker `index`, borders included.
    pub fn span(&self, index: usize) -> WorkerRange {
        debug_assert!(index < self.workers);
        let chunk = self.chunk();
        let start = index * chunk;
        let end = if self.is_last(index) {
            self.extent
        } else {
            start + chunk
        };
        WorkerRange { start, end }
    }

    pub fn ranges(&self) -> impl Iterator<Item = WorkerRange> + '_ {
        (0..self.workers).map(move |i| self.range(i))
    }

    pub fn spans(&self) -> impl Iterator<Item = WorkerRange> + '_ {
        (0..self.workers).map(move |i| self.span(i))
    }
}
