//! Run reports shared by both decompositions.
//!
//! `FilterReport` records the image shape, the decomposition that was used,
//! what every worker was assigned and per-stage timings. It serializes to
//! camelCase JSON for the tools' `report_json` output.

pub mod run;
pub mod timing;

pub use run::{FilterReport, Variant, WorkerReport};
pub use timing::{elapsed_ms, StageTiming, Stopwatch, TimingBreakdown};
