//! Static work decomposition.
//!
//! - [`RangePartitioner`] splits rows or columns across workers with a fixed
//!   formula; the last worker absorbs the remainder.
//! - [`RowLayout`] maps rows to byte offsets of an RGBA buffer.
//! - [`GatherPlan`] sizes the per-rank slices collected by the coordinator
//!   from the two above.
pub mod layout;
pub mod range;

pub use layout::{GatherMode, GatherPlan, RowLayout};
pub use range::{Axis, RangePartitioner, WorkerRange};
