use std::collections::HashMap;

use tracing::{debug, warn};

use storage::SnapshotSource;
use tracker_core::aggregate::{
    AggregationResult, BenchmarkAggregator, MasteryRollup, PendingOverride, ProgressAggregator,
    ProgressDisplay, attach_masteries,
};
use tracker_core::graph::{GraphAnomaly, TopicGraph};
use tracker_core::model::{Entry, Topic, TopicId, UserId};

use crate::error::TopicServiceError;

/// Separator used in breadcrumb labels.
pub const PATH_SEPARATOR: &str = " › ";

//
// ─── TOPIC SERVICE ─────────────────────────────────────────────────────────────
//

/// Aggregated view of one topic snapshot.
///
/// Holds the graph and the benchmark table computed for it. Both are
/// replaced together on `refresh`, so no value outlives its snapshot.
#[derive(Debug, Clone, Default)]
pub struct TopicService {
    snapshot: Vec<Topic>,
    graph: TopicGraph,
    anomalies: Vec<GraphAnomaly>,
    benchmarks: HashMap<TopicId, f64>,
}

impl TopicService {
    /// Build from a possibly malformed snapshot, repairing cycles and
    /// duplicates and logging every repair.
    #[must_use]
    pub fn from_topics(topics: Vec<Topic>) -> Self {
        let (graph, anomalies) = TopicGraph::build_lenient(topics.clone());
        for anomaly in &anomalies {
            match anomaly {
                GraphAnomaly::Cycle(id) => {
                    warn!(topic = %id, "topic sits on a parent cycle; aggregating it as a leaf");
                }
                GraphAnomaly::Duplicate(id) => {
                    warn!(topic = %id, "duplicate topic in snapshot; keeping the first copy");
                }
            }
        }
        Self::assemble(topics, graph, anomalies)
    }

    /// Build from a snapshot that must already be well formed.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Graph` on duplicate ids or a parent cycle.
    pub fn from_topics_strict(topics: Vec<Topic>) -> Result<Self, TopicServiceError> {
        let graph = TopicGraph::build(topics.clone())?;
        Ok(Self::assemble(topics, graph, Vec::new()))
    }

    /// Fetch topics from `source` and build leniently.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` if the source cannot be read.
    pub async fn load(source: &dyn SnapshotSource) -> Result<Self, TopicServiceError> {
        let topics = source.fetch_topics().await?;
        Ok(Self::from_topics(topics))
    }

    /// Replace the snapshot with a fresh fetch from `source`.
    ///
    /// # Errors
    ///
    /// Returns `TopicServiceError::Storage` if the source cannot be read; the
    /// current snapshot is kept in that case.
    pub async fn refresh(&mut self, source: &dyn SnapshotSource) -> Result<(), TopicServiceError> {
        *self = Self::load(source).await?;
        debug!(topics = self.graph.len(), "topic snapshot refreshed");
        Ok(())
    }

    fn assemble(snapshot: Vec<Topic>, graph: TopicGraph, anomalies: Vec<GraphAnomaly>) -> Self {
        let benchmarks = BenchmarkAggregator::new(&graph).table().clone();
        Self {
            snapshot,
            graph,
            anomalies,
            benchmarks,
        }
    }

    #[must_use]
    pub fn graph(&self) -> &TopicGraph {
        &self.graph
    }

    /// Repairs made while building the current snapshot.
    #[must_use]
    pub fn anomalies(&self) -> &[GraphAnomaly] {
        &self.anomalies
    }

    #[must_use]
    pub fn topic(&self, id: TopicId) -> Option<&Topic> {
        self.graph.get(id)
    }

    /// Effective benchmark hours; `0.0` for unknown topics.
    #[must_use]
    pub fn effective_benchmark(&self, id: TopicId) -> f64 {
        self.benchmarks.get(&id).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn display_progress(
        &self,
        id: TopicId,
        pending_override: Option<PendingOverride>,
    ) -> ProgressDisplay {
        ProgressAggregator::new(&self.graph).display_progress(id, pending_override)
    }

    #[must_use]
    pub fn aggregate(
        &self,
        id: TopicId,
        pending_override: Option<PendingOverride>,
    ) -> AggregationResult {
        AggregationResult::new(
            id,
            self.effective_benchmark(id),
            self.display_progress(id, pending_override),
        )
    }

    /// Results for every active topic, in snapshot order.
    #[must_use]
    pub fn aggregate_all(&self) -> Vec<AggregationResult> {
        self.graph
            .topics()
            .iter()
            .filter(|topic| topic.is_active())
            .map(|topic| self.aggregate(topic.id(), None))
            .collect()
    }

    /// Breadcrumb from the root down to `id` itself, e.g. `Frontend › React`.
    ///
    /// Empty for unknown topics.
    #[must_use]
    pub fn path_label(&self, id: TopicId) -> String {
        let Some(topic) = self.graph.get(id) else {
            return String::new();
        };
        let mut parts = self.graph.path_to(id);
        parts.push(topic.name().to_owned());
        parts.join(PATH_SEPARATOR)
    }

    /// A new snapshot whose mastery records are rebuilt from `user`'s entries.
    #[must_use]
    pub fn with_learner_mastery(&self, entries: &[Entry], user: UserId) -> Self {
        let masteries = MasteryRollup::new(&self.graph).compute(entries, user);
        debug!(%user, topics = masteries.len(), "mastery recalculated");
        Self::from_topics(attach_masteries(&self.snapshot, &masteries))
    }
}
