use std::collections::HashMap;

use crate::graph::TopicGraph;
use crate::model::{Entry, Mastery, Topic, TopicId, UserId};

/// Lock reason for a topic completed by one of its own entries.
pub const COMPLETED_REASON: &str = "completed";
/// Lock reason for a parent whose every subtopic is mastered.
pub const SUBTOPICS_COMPLETED_REASON: &str = "all subtopics completed";
/// Lock reason for a topic forced to 100% by a completed ancestor.
pub const PARENT_COMPLETED_REASON: &str = "completed via parent topic";

/// Rebuilds one learner's mastery records from their entries.
///
/// Leaves take the best progress of their entries (100% once any entry is
/// completed). Parents average their active children unless they were
/// completed directly. A locked topic then forces every active descendant to
/// 100%.
#[derive(Debug, Clone, Copy)]
pub struct MasteryRollup<'g> {
    graph: &'g TopicGraph,
}

impl<'g> MasteryRollup<'g> {
    #[must_use]
    pub fn new(graph: &'g TopicGraph) -> Self {
        Self { graph }
    }

    /// Mastery for every active topic, using only `user`'s entries.
    #[must_use]
    pub fn compute(&self, entries: &[Entry], user: UserId) -> HashMap<TopicId, Mastery> {
        let mut by_topic: HashMap<TopicId, Vec<&Entry>> = HashMap::new();
        for entry in entries.iter().filter(|e| e.user_id() == user) {
            if let Some(topic) = entry.topic_id() {
                by_topic.entry(topic).or_default().push(entry);
            }
        }

        let mut organic: HashMap<TopicId, Mastery> = HashMap::new();
        for topic in self.graph.topics().iter().filter(|t| t.is_active()) {
            self.roll_up(topic.id(), &by_topic, &mut organic);
        }
        self.propagate_down(&mut organic);
        organic
    }

    /// Post-order fill of `out` below and including `start`.
    fn roll_up(
        &self,
        start: TopicId,
        by_topic: &HashMap<TopicId, Vec<&Entry>>,
        out: &mut HashMap<TopicId, Mastery>,
    ) {
        let mut stack = vec![(start, false)];
        while let Some((id, children_done)) = stack.pop() {
            if out.contains_key(&id) {
                continue;
            }
            let children = self.graph.children_of(id);
            let direct = by_topic.get(&id).map_or(&[][..], Vec::as_slice);
            if children.is_empty() {
                out.insert(id, leaf_mastery(direct));
            } else if children_done {
                let child_masteries: Vec<&Mastery> =
                    children.iter().filter_map(|c| out.get(&c.id())).collect();
                out.insert(id, parent_mastery(direct, &child_masteries));
            } else {
                stack.push((id, true));
                stack.extend(children.iter().map(|child| (child.id(), false)));
            }
        }
    }

    fn propagate_down(&self, masteries: &mut HashMap<TopicId, Mastery>) {
        let tops = self.graph.topics().iter().filter(|t| {
            t.is_active() && self.graph.parent_of(t.id()).is_none_or(|p| !p.is_active())
        });
        for top in tops {
            let order = std::iter::once(top).chain(self.graph.descendants_of(top.id()));
            for topic in order {
                let locked = masteries.get(&topic.id()).is_some_and(Mastery::is_locked);
                if !locked {
                    continue;
                }
                for child in self.graph.children_of(topic.id()) {
                    if let Some(current) = masteries.get_mut(&child.id()) {
                        if !current.is_locked() {
                            *current = Mastery::mastered(PARENT_COMPLETED_REASON)
                                .with_total_hours(current.total_hours());
                        }
                    }
                }
            }
        }
    }
}

fn leaf_mastery(entries: &[&Entry]) -> Mastery {
    let hours: f64 = entries.iter().map(|e| e.hours()).sum();
    if entries.iter().any(|e| e.is_completed()) {
        return Mastery::mastered(COMPLETED_REASON).with_total_hours(hours);
    }
    let best = entries
        .iter()
        .map(|e| e.progress_percent())
        .fold(0.0_f64, f64::max);
    if best >= 100.0 {
        return Mastery::mastered(COMPLETED_REASON).with_total_hours(hours);
    }
    Mastery::clamped(best).with_total_hours(hours)
}

fn parent_mastery(direct: &[&Entry], children: &[&Mastery]) -> Mastery {
    let hours = direct.iter().map(|e| e.hours()).sum::<f64>()
        + children.iter().map(|m| m.total_hours()).sum::<f64>();
    if direct.iter().any(|e| e.is_completed()) {
        return Mastery::mastered(COMPLETED_REASON).with_total_hours(hours);
    }
    if children.is_empty() {
        return Mastery::clamped(0.0).with_total_hours(hours);
    }
    #[allow(clippy::cast_precision_loss)]
    let average = children.iter().map(|m| m.progress()).sum::<f64>() / children.len() as f64;
    let all_mastered = children
        .iter()
        .all(|m| m.is_locked() && m.progress() >= 100.0);
    let mastery = Mastery::clamped(average);
    let mastery = if all_mastered {
        mastery.locked(SUBTOPICS_COMPLETED_REASON)
    } else {
        mastery
    };
    mastery.with_total_hours(hours)
}

/// Copy `topics`, replacing each topic's mastery with the rolled-up record.
///
/// Topics without a record (inactive ones) end up with no mastery.
#[must_use]
pub fn attach_masteries(topics: &[Topic], masteries: &HashMap<TopicId, Mastery>) -> Vec<Topic> {
    topics
        .iter()
        .map(|topic| {
            topic
                .clone()
                .with_mastery(masteries.get(&topic.id()).cloned())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryId, EntryTarget};
    use crate::time::fixed_today;

    fn topic(id: u64, parent: Option<u64>) -> Topic {
        Topic::from_snapshot(
            TopicId::new(id),
            parent.map(TopicId::new),
            format!("t{id}"),
            1.0,
            true,
            None,
        )
    }

    fn entry(id: u64, user: u64, topic: u64, hours: f64, progress: f64) -> Entry {
        Entry::new(
            EntryId::new(id),
            UserId::new(user),
            EntryTarget::Topic(TopicId::new(topic)),
            hours,
            progress,
            fixed_today(),
        )
        .unwrap()
    }

    fn graph() -> TopicGraph {
        TopicGraph::build(vec![
            topic(1, None),
            topic(2, Some(1)),
            topic(3, Some(1)),
            topic(4, Some(3)),
        ])
        .unwrap()
    }

    #[test]
    fn leaf_takes_best_progress_and_sums_hours() {
        let graph = graph();
        let entries = vec![entry(1, 1, 2, 1.5, 30.0), entry(2, 1, 2, 2.0, 55.0)];
        let masteries = MasteryRollup::new(&graph).compute(&entries, UserId::new(1));
        let react = &masteries[&TopicId::new(2)];
        assert_eq!(react.progress(), 55.0);
        assert_eq!(react.total_hours(), 3.5);
        assert!(!react.is_locked());
    }

    #[test]
    fn parent_averages_children_and_sums_hours() {
        let graph = graph();
        let entries = vec![entry(1, 1, 2, 1.0, 40.0), entry(2, 1, 4, 2.0, 80.0)];
        let masteries = MasteryRollup::new(&graph).compute(&entries, UserId::new(1));
        assert_eq!(masteries[&TopicId::new(3)].progress(), 80.0);
        assert_eq!(masteries[&TopicId::new(1)].progress(), 60.0);
        assert_eq!(masteries[&TopicId::new(1)].total_hours(), 3.0);
    }

    #[test]
    fn other_users_entries_are_ignored() {
        let graph = graph();
        let entries = vec![entry(1, 2, 2, 1.0, 90.0)];
        let masteries = MasteryRollup::new(&graph).compute(&entries, UserId::new(1));
        assert_eq!(masteries[&TopicId::new(2)].progress(), 0.0);
    }

    #[test]
    fn completed_parent_locks_descendants() {
        let graph = graph();
        let entries = vec![entry(1, 1, 1, 1.0, 0.0).completed(), entry(2, 1, 4, 2.0, 10.0)];
        let masteries = MasteryRollup::new(&graph).compute(&entries, UserId::new(1));
        let deep = &masteries[&TopicId::new(4)];
        assert!(deep.is_locked());
        assert_eq!(deep.progress(), 100.0);
        assert_eq!(deep.lock_reason(), Some(PARENT_COMPLETED_REASON));
        assert_eq!(deep.total_hours(), 2.0);
        assert_eq!(masteries[&TopicId::new(1)].lock_reason(), Some(COMPLETED_REASON));
    }

    #[test]
    fn parent_locks_when_every_child_is_mastered() {
        let graph = graph();
        let entries = vec![entry(1, 1, 2, 1.0, 0.0).completed(), entry(2, 1, 4, 1.0, 100.0)];
        let masteries = MasteryRollup::new(&graph).compute(&entries, UserId::new(1));
        let root = &masteries[&TopicId::new(1)];
        assert!(root.is_locked());
        assert_eq!(root.lock_reason(), Some(SUBTOPICS_COMPLETED_REASON));
    }

    #[test]
    fn attach_masteries_sets_progress_for_aggregation() {
        let graph = graph();
        let entries = vec![entry(1, 1, 2, 1.0, 25.0)];
        let masteries = MasteryRollup::new(&graph).compute(&entries, UserId::new(1));
        let topics = attach_masteries(graph.topics(), &masteries);
        assert_eq!(topics[1].stored_progress(), 25.0);
    }
}
