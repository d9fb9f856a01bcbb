use super::timing::TimingBreakdown;
use crate::message::DistributionMode;
use crate::partition::{Axis, GatherMode, WorkerRange};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    MessagePassing,
    SharedMemory,
}

/// What one rank or task was assigned and how long its part took.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerReport {
    pub worker: usize,
    pub axis: Axis,
    /// Interior rows or columns computed.
    pub range: WorkerRange,
    /// Rows or columns owned, borders included.
    pub span: WorkerRange,
    pub pixels: usize,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterReport {
    pub variant: Variant,
    pub width: usize,
    pub height: usize,
    pub workers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<DistributionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gather: Option<GatherMode>,
    pub per_worker: Vec<WorkerReport>,
    pub timings: TimingBreakdown,
}

impl FilterReport {
    /// Pixels written across all workers.
    pub fn pixels(&self) -> usize {
        self.per_worker.iter().map(|w| w.pixels).sum()
    }
}
