use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Wall-clock time of one step of a filter run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    /// Time recorded under `label`, if that stage ran.
    pub fn stage_ms(&self, label: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }
}

/// Clock for one filter run. Each lap closes a stage; `finish` stamps the
/// total since `start`.
#[derive(Debug)]
pub struct Stopwatch {
    start: Instant,
    last: Instant,
    timings: TimingBreakdown,
}

impl Stopwatch {
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            timings: TimingBreakdown::default(),
        }
    }

    /// Close the current stage under `label`.
    pub fn lap(&mut self, label: impl Into<String>) {
        let ms = elapsed_ms(self.last);
        self.record(label, ms);
        self.last = Instant::now();
    }

    /// Add a stage measured elsewhere (e.g. on a worker thread).
    pub fn record(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.timings.stages.push(StageTiming {
            label: label.into(),
            elapsed_ms,
        });
    }

    pub fn elapsed_ms(&self) -> f64 {
        elapsed_ms(self.start)
    }

    pub fn finish(mut self) -> TimingBreakdown {
        self.timings.total_ms = elapsed_ms(self.start);
        self.timings
    }
}

#[inline]
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
