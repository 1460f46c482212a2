use std::cell::OnceCell;
use std::collections::HashMap;

use crate::graph::TopicGraph;
use crate::model::TopicId;

/// Effective benchmark hours over one graph snapshot.
///
/// A topic with active children is worth the sum of its children's effective
/// benchmarks; a leaf is worth its own `benchmark_hours`. The whole table is
/// computed on first query with an iterative post-order walk and kept for the
/// lifetime of the aggregator, which borrows the graph it was built from.
/// Building a new graph (e.g. after a topic is deactivated) means building a
/// new aggregator, so no value outlives its snapshot.
///
/// # Examples
///
/// ```
/// # use tracker_core::aggregate::BenchmarkAggregator;
/// # use tracker_core::graph::TopicGraph;
/// # use tracker_core::model::{Topic, TopicId};
/// let frontend = TopicId::new(1);
/// let graph = TopicGraph::build(vec![
///     Topic::new(frontend, None, "Frontend", 0.0)?,
///     Topic::new(TopicId::new(2), Some(frontend), "React", 10.0)?,
///     Topic::new(TopicId::new(3), Some(frontend), "CSS", 5.0)?,
/// ])?;
/// let benchmarks = BenchmarkAggregator::new(&graph);
/// assert_eq!(benchmarks.effective_benchmark(frontend), 15.0);
/// # Ok::<(), tracker_core::Error>(())
/// ```
#[derive(Debug)]
pub struct BenchmarkAggregator<'g> {
    graph: &'g TopicGraph,
    table: OnceCell<HashMap<TopicId, f64>>,
}

impl<'g> BenchmarkAggregator<'g> {
    #[must_use]
    pub fn new(graph: &'g TopicGraph) -> Self {
        Self {
            graph,
            table: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn graph(&self) -> &'g TopicGraph {
        self.graph
    }

    /// Effective benchmark hours for `id`; `0.0` for unknown topics.
    #[must_use]
    pub fn effective_benchmark(&self, id: TopicId) -> f64 {
        self.table().get(&id).copied().unwrap_or(0.0)
    }

    /// Effective benchmark of every topic in the graph, inactive ones included.
    #[must_use]
    pub fn table(&self) -> &HashMap<TopicId, f64> {
        self.table.get_or_init(|| compute_table(self.graph))
    }
}

fn compute_table(graph: &TopicGraph) -> HashMap<TopicId, f64> {
    let mut table: HashMap<TopicId, f64> = HashMap::with_capacity(graph.len());
    let mut stack: Vec<(TopicId, bool)> = Vec::new();

    for start in graph.topics() {
        if table.contains_key(&start.id()) {
            continue;
        }
        stack.push((start.id(), false));
        while let Some((id, children_done)) = stack.pop() {
            if table.contains_key(&id) {
                continue;
            }
            let children = if graph.is_quarantined(id) {
                Vec::new()
            } else {
                graph.children_of(id)
            };
            if children.is_empty() {
                let own = graph.get(id).map_or(0.0, |t| t.benchmark_hours());
                table.insert(id, own);
            } else if children_done {
                let sum = children
                    .iter()
                    .map(|child| table.get(&child.id()).copied().unwrap_or(0.0))
                    .sum();
                table.insert(id, sum);
            } else {
                stack.push((id, true));
                stack.extend(
                    children
                        .iter()
                        .filter(|child| !table.contains_key(&child.id()))
                        .map(|child| (child.id(), false)),
                );
            }
        }
    }
    table
}

/// Round a value for presentation only; aggregation never rounds.
#[must_use]
pub fn round_for_display(value: f64, decimals: u8) -> f64 {
    let factor = 10_f64.powi(i32::from(decimals));
    (value * factor).round() / factor
}
