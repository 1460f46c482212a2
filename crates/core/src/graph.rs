use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::model::{Topic, TopicId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    #[error("topic {0} is its own ancestor")]
    CycleDetected(TopicId),

    #[error("topic {0} appears more than once in the snapshot")]
    DuplicateTopic(TopicId),
}

/// A data-integrity problem repaired by `TopicGraph::build_lenient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphAnomaly {
    /// The topic sat on a parent cycle; its parent link was severed and it is
    /// aggregated as a leaf.
    Cycle(TopicId),
    /// A later duplicate of the topic was dropped.
    Duplicate(TopicId),
}

impl GraphAnomaly {
    #[must_use]
    pub fn topic_id(&self) -> TopicId {
        match self {
            Self::Cycle(id) | Self::Duplicate(id) => *id,
        }
    }
}

//
// ─── GRAPH ─────────────────────────────────────────────────────────────────────
//

/// In-memory forest of topics built from a flat snapshot.
///
/// The graph is immutable once built; a refreshed snapshot means a new graph.
#[derive(Debug, Clone, Default)]
pub struct TopicGraph {
    topics: Vec<Topic>,
    index: HashMap<TopicId, usize>,
    active_children: HashMap<TopicId, Vec<usize>>,
    quarantined: HashSet<TopicId>,
}

impl TopicGraph {
    /// Build a graph, rejecting duplicate ids and parent cycles.
    ///
    /// # Errors
    ///
    /// - `DuplicateTopic` if an id occurs twice
    /// - `CycleDetected` naming the first topic found on a parent cycle
    pub fn build(topics: impl IntoIterator<Item = Topic>) -> Result<Self, GraphError> {
        let topics: Vec<Topic> = topics.into_iter().collect();
        let mut index = HashMap::with_capacity(topics.len());
        for (pos, topic) in topics.iter().enumerate() {
            if index.insert(topic.id(), pos).is_some() {
                return Err(GraphError::DuplicateTopic(topic.id()));
            }
        }
        if let Some(id) = find_cycle(&topics, &index) {
            return Err(GraphError::CycleDetected(id));
        }
        Ok(Self::assemble(topics, index, HashSet::new()))
    }

    /// Build a graph from a possibly malformed snapshot.
    ///
    /// Duplicates keep their first occurrence. Every topic reported on a cycle
    /// loses its parent link and is quarantined, which the benchmark
    /// aggregator treats as a leaf. The repairs are returned so the caller can
    /// report them.
    #[must_use]
    pub fn build_lenient(topics: impl IntoIterator<Item = Topic>) -> (Self, Vec<GraphAnomaly>) {
        let mut anomalies = Vec::new();
        let mut kept: Vec<Topic> = Vec::new();
        let mut index = HashMap::new();
        for topic in topics {
            if index.contains_key(&topic.id()) {
                anomalies.push(GraphAnomaly::Duplicate(topic.id()));
                continue;
            }
            index.insert(topic.id(), kept.len());
            kept.push(topic);
        }

        let mut quarantined = HashSet::new();
        while let Some(id) = find_cycle(&kept, &index) {
            if let Some(&pos) = index.get(&id) {
                kept[pos].detach_parent();
            }
            quarantined.insert(id);
            anomalies.push(GraphAnomaly::Cycle(id));
        }

        (Self::assemble(kept, index, quarantined), anomalies)
    }

    fn assemble(
        topics: Vec<Topic>,
        index: HashMap<TopicId, usize>,
        quarantined: HashSet<TopicId>,
    ) -> Self {
        let mut active_children: HashMap<TopicId, Vec<usize>> = HashMap::new();
        for (pos, topic) in topics.iter().enumerate() {
            if !topic.is_active() {
                continue;
            }
            if let Some(parent) = topic.parent_id().filter(|p| index.contains_key(p)) {
                active_children.entry(parent).or_default().push(pos);
            }
        }
        Self {
            topics,
            index,
            active_children,
            quarantined,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: TopicId) -> Option<&Topic> {
        self.index.get(&id).map(|&pos| &self.topics[pos])
    }

    /// All topics, active or not, in snapshot order.
    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Active topics without a known parent.
    #[must_use]
    pub fn roots(&self) -> Vec<&Topic> {
        self.topics
            .iter()
            .filter(|t| t.is_active() && self.known_parent(t).is_none())
            .collect()
    }

    /// Direct active children of `id`; empty for leaves and unknown ids.
    #[must_use]
    pub fn children_of(&self, id: TopicId) -> Vec<&Topic> {
        self.active_children
            .get(&id)
            .map(|positions| positions.iter().map(|&pos| &self.topics[pos]).collect())
            .unwrap_or_default()
    }

    /// Active topics with the same raw `parent_id` as `id`.
    ///
    /// Top-level topics share the absent parent; topics naming the same
    /// missing parent form their own group.
    #[must_use]
    pub fn siblings_of(&self, id: TopicId, include_self: bool) -> Vec<&Topic> {
        let Some(topic) = self.get(id) else {
            return Vec::new();
        };
        let parent = topic.parent_id();
        self.topics
            .iter()
            .filter(|t| t.is_active() && t.parent_id() == parent)
            .filter(|t| include_self || t.id() != id)
            .collect()
    }

    /// Ancestor names from the root down to the direct parent.
    ///
    /// Empty for roots and unknown ids.
    #[must_use]
    pub fn path_to(&self, id: TopicId) -> Vec<String> {
        let mut names: Vec<String> = self
            .ancestors(id)
            .map(|ancestor| ancestor.name().to_owned())
            .collect();
        names.reverse();
        names
    }

    /// Number of ancestors above `id`, or `None` for unknown ids.
    #[must_use]
    pub fn depth_of(&self, id: TopicId) -> Option<usize> {
        self.get(id)?;
        Some(self.ancestors(id).count())
    }

    /// Active descendants of `id` in pre-order.
    #[must_use]
    pub fn descendants_of(&self, id: TopicId) -> Vec<&Topic> {
        let mut out = Vec::new();
        let mut stack: Vec<&Topic> = self.children_of(id).into_iter().rev().collect();
        while let Some(topic) = stack.pop() {
            out.push(topic);
            stack.extend(self.children_of(topic.id()).into_iter().rev());
        }
        out
    }

    /// Whether `id` was cut off a parent cycle by `build_lenient`.
    #[must_use]
    pub fn is_quarantined(&self, id: TopicId) -> bool {
        self.quarantined.contains(&id)
    }

    /// The parent of `topic`, if it exists in this snapshot.
    #[must_use]
    pub fn parent_of(&self, id: TopicId) -> Option<&Topic> {
        self.get(id).and_then(|topic| self.known_parent(topic))
    }

    fn known_parent(&self, topic: &Topic) -> Option<&Topic> {
        topic.parent_id().and_then(|parent| self.get(parent))
    }

    fn ancestors(&self, id: TopicId) -> impl Iterator<Item = &Topic> {
        // Acyclic by construction, so the walk is bounded by the graph depth.
        std::iter::successors(self.parent_of(id), |topic| self.known_parent(topic))
    }
}

/// Walk each parent chain once; returns the first topic revisited on a chain.
fn find_cycle(topics: &[Topic], index: &HashMap<TopicId, usize>) -> Option<TopicId> {
    let mut clear: HashSet<TopicId> = HashSet::with_capacity(topics.len());
    for start in topics {
        let mut visited: HashSet<TopicId> = HashSet::new();
        let mut current = start;
        let mut steps = 0_usize;
        loop {
            if clear.contains(&current.id()) {
                break;
            }
            if !visited.insert(current.id()) {
                return Some(current.id());
            }
            steps += 1;
            if steps > topics.len() {
                return Some(start.id());
            }
            match current.parent_id().and_then(|p| index.get(&p)) {
                Some(&pos) => current = &topics[pos],
                None => break,
            }
        }
        clear.extend(visited);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: u64, parent: Option<u64>, name: &str, hours: f64) -> Topic {
        Topic::from_snapshot(
            TopicId::new(id),
            parent.map(TopicId::new),
            name.to_owned(),
            hours,
            true,
            None,
        )
    }

    fn names(topics: &[&Topic]) -> Vec<String> {
        topics.iter().map(|t| t.name().to_owned()).collect()
    }

    fn sample() -> TopicGraph {
        TopicGraph::build(vec![
            topic(1, None, "Frontend", 0.0),
            topic(2, Some(1), "React", 10.0),
            topic(3, Some(1), "CSS", 5.0),
            topic(4, Some(2), "Hooks", 3.0),
            topic(5, Some(1), "Legacy", 8.0).inactive(),
            topic(6, None, "Backend", 12.0),
        ])
        .unwrap()
    }

    #[test]
    fn children_of_skips_inactive() {
        let graph = sample();
        assert_eq!(names(&graph.children_of(TopicId::new(1))), ["React", "CSS"]);
        assert!(graph.children_of(TopicId::new(3)).is_empty());
        assert!(graph.children_of(TopicId::new(99)).is_empty());
    }

    #[test]
    fn path_to_lists_ancestors_root_first() {
        let graph = sample();
        assert_eq!(graph.path_to(TopicId::new(4)), ["Frontend", "React"]);
        assert!(graph.path_to(TopicId::new(1)).is_empty());
        assert!(graph.path_to(TopicId::new(42)).is_empty());
    }

    #[test]
    fn siblings_respect_include_self() {
        let graph = sample();
        let with_self = graph.siblings_of(TopicId::new(2), true);
        let without = graph.siblings_of(TopicId::new(2), false);
        assert_eq!(names(&with_self), ["React", "CSS"]);
        assert_eq!(names(&without), ["CSS"]);
        assert_eq!(names(&graph.siblings_of(TopicId::new(1), false)), ["Backend"]);
    }

    #[test]
    fn depth_and_descendants() {
        let graph = sample();
        assert_eq!(graph.depth_of(TopicId::new(1)), Some(0));
        assert_eq!(graph.depth_of(TopicId::new(4)), Some(2));
        assert_eq!(graph.depth_of(TopicId::new(77)), None);
        assert_eq!(
            names(&graph.descendants_of(TopicId::new(1))),
            ["React", "Hooks", "CSS"]
        );
    }

    #[test]
    fn two_node_cycle_is_rejected() {
        let err = TopicGraph::build(vec![
            topic(1, Some(2), "A", 1.0),
            topic(2, Some(1), "B", 1.0),
        ])
        .unwrap_err();
        assert_eq!(err, GraphError::CycleDetected(TopicId::new(1)));
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let err = TopicGraph::build(vec![topic(7, Some(7), "Loop", 1.0)]).unwrap_err();
        assert_eq!(err, GraphError::CycleDetected(TopicId::new(7)));
    }

    #[test]
    fn cycle_reported_on_the_loop_not_the_tail() {
        let err = TopicGraph::build(vec![
            topic(3, Some(1), "Tail", 1.0),
            topic(1, Some(2), "A", 1.0),
            topic(2, Some(1), "B", 1.0),
        ])
        .unwrap_err();
        assert_eq!(err, GraphError::CycleDetected(TopicId::new(1)));
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = TopicGraph::build(vec![topic(1, None, "A", 1.0), topic(1, None, "A2", 1.0)])
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateTopic(TopicId::new(1)));
    }

    #[test]
    fn dangling_parent_is_treated_as_root() {
        let graph = TopicGraph::build(vec![topic(1, Some(99), "Orphan", 2.0)]).unwrap();
        assert_eq!(names(&graph.roots()), ["Orphan"]);
        assert!(graph.path_to(TopicId::new(1)).is_empty());
    }

    #[test]
    fn siblings_share_the_same_missing_parent_only() {
        let graph = TopicGraph::build(vec![
            topic(1, None, "Rust", 1.0),
            topic(2, Some(98), "Orphan A", 1.0),
            topic(3, Some(98), "Orphan B", 1.0),
            topic(4, Some(99), "Stray", 1.0),
        ])
        .unwrap();
        assert_eq!(names(&graph.siblings_of(TopicId::new(2), true)), ["Orphan A", "Orphan B"]);
        assert_eq!(names(&graph.siblings_of(TopicId::new(4), true)), ["Stray"]);
        assert_eq!(names(&graph.siblings_of(TopicId::new(1), true)), ["Rust"]);
    }

    #[test]
    fn lenient_build_breaks_cycles_and_reports() {
        let (graph, anomalies) = TopicGraph::build_lenient(vec![
            topic(1, Some(2), "A", 1.0),
            topic(2, Some(1), "B", 4.0),
            topic(2, None, "B again", 9.0),
        ]);
        assert_eq!(
            anomalies,
            vec![
                GraphAnomaly::Duplicate(TopicId::new(2)),
                GraphAnomaly::Cycle(TopicId::new(1)),
            ]
        );
        assert!(graph.is_quarantined(TopicId::new(1)));
        assert_eq!(graph.get(TopicId::new(1)).unwrap().parent_id(), None);
        assert_eq!(graph.path_to(TopicId::new(2)), ["A"]);
    }

    #[test]
    fn long_chain_builds_without_recursion() {
        let mut topics = vec![topic(0, None, "root", 0.0)];
        for id in 1..5_000 {
            topics.push(topic(id, Some(id - 1), "node", 1.0));
        }
        let graph = TopicGraph::build(topics).unwrap();
        assert_eq!(graph.depth_of(TopicId::new(4_999)), Some(4_999));
    }
}
