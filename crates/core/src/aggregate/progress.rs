use crate::graph::TopicGraph;
use crate::model::{Topic, TopicId};

/// An unsaved "mark completed" intent from an open entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOverride {
    pub topic_id: TopicId,
    pub completed: bool,
}

impl PendingOverride {
    #[must_use]
    pub fn completed(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            completed: true,
        }
    }

    #[must_use]
    pub fn not_completed(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            completed: false,
        }
    }
}

/// Progress value and the label it should be shown under.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressDisplay {
    pub value: f64,
    pub label: String,
}

impl ProgressDisplay {
    fn unknown() -> Self {
        Self {
            value: 0.0,
            label: String::new(),
        }
    }
}

/// Displayed mastery progress for a topic within its sibling group.
///
/// A topic that shares its parent with other active topics is shown as the
/// group average under the parent's name; otherwise its own stored progress
/// is shown under its own name. Inactive topics belong to no group and
/// always show their own value. Missing mastery always counts as 0.
#[derive(Debug, Clone, Copy)]
pub struct ProgressAggregator<'g> {
    graph: &'g TopicGraph,
}

impl<'g> ProgressAggregator<'g> {
    #[must_use]
    pub fn new(graph: &'g TopicGraph) -> Self {
        Self { graph }
    }

    /// Progress for `id`, folding in an optional pending completion edit.
    ///
    /// The override is applied to whichever member of the group it names and
    /// never touches stored state. Unknown topics yield `0` with an empty label.
    #[must_use]
    pub fn display_progress(
        &self,
        id: TopicId,
        pending_override: Option<PendingOverride>,
    ) -> ProgressDisplay {
        let Some(topic) = self.graph.get(id) else {
            return ProgressDisplay::unknown();
        };

        let own = || ProgressDisplay {
            value: clamp_percent(contribution(topic, pending_override)),
            label: topic.name().to_owned(),
        };

        if !topic.is_active() {
            return own();
        }
        let Some(parent) = self.graph.parent_of(id) else {
            return own();
        };
        let others: Vec<&Topic> = self
            .graph
            .children_of(parent.id())
            .into_iter()
            .filter(|sibling| sibling.id() != id)
            .collect();
        if others.is_empty() {
            return own();
        }

        let group_size = others.len() + 1;
        let total: f64 = others
            .iter()
            .map(|sibling| contribution(sibling, pending_override))
            .sum::<f64>()
            + contribution(topic, pending_override);

        #[allow(clippy::cast_precision_loss)]
        let value = total / group_size as f64;
        ProgressDisplay {
            value: clamp_percent(value),
            label: parent.name().to_owned(),
        }
    }
}

fn contribution(topic: &Topic, pending_override: Option<PendingOverride>) -> f64 {
    match pending_override {
        Some(edit) if edit.topic_id == topic.id() && edit.completed => 100.0,
        _ => topic.stored_progress(),
    }
}

fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
