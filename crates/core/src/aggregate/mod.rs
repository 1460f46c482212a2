//! Derived per-topic values: effective benchmarks, displayed progress and
//! mastery rollups. Nothing here is persisted; every value is recomputed from
//! the graph snapshot it borrows.

pub mod benchmark;
pub mod mastery;
pub mod progress;

use serde::Serialize;

use crate::model::TopicId;

pub use benchmark::{BenchmarkAggregator, round_for_display};
pub use mastery::{MasteryRollup, attach_masteries};
pub use progress::{PendingOverride, ProgressAggregator, ProgressDisplay};

/// Per-topic numbers handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub topic_id: TopicId,
    pub effective_benchmark_hours: f64,
    pub effective_progress_percent: f64,
    pub display_label: String,
}

impl AggregationResult {
    #[must_use]
    pub fn new(topic_id: TopicId, effective_benchmark_hours: f64, progress: ProgressDisplay) -> Self {
        Self {
            topic_id,
            effective_benchmark_hours,
            effective_progress_percent: progress.value,
            display_label: progress.label,
        }
    }
}
