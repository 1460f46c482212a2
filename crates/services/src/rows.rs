//! Row view models rendered by the review navigator.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use tracker_core::aggregate::{PendingOverride, round_for_display};
use tracker_core::model::{
    AiStatus, Entry, EntryId, EntryStatus, ProjectId, Topic, TopicId, UserId,
};
use tracker_core::query::{FieldValue, Queryable};

use crate::topic_service::TopicService;

/// One line of the topics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicRow {
    pub id: TopicId,
    pub name: String,
    pub path: String,
    pub benchmark_hours: f64,
    pub progress_percent: f64,
    pub progress_label: String,
    pub is_active: bool,
}

impl TopicRow {
    #[must_use]
    pub fn build(
        topic: &Topic,
        topics: &TopicService,
        pending_override: Option<PendingOverride>,
        decimals: u8,
    ) -> Self {
        let result = topics.aggregate(topic.id(), pending_override);
        Self {
            id: topic.id(),
            name: topic.name().to_owned(),
            path: topics.path_label(topic.id()),
            benchmark_hours: round_for_display(result.effective_benchmark_hours, decimals),
            progress_percent: round_for_display(result.effective_progress_percent, decimals),
            progress_label: result.display_label,
            is_active: topic.is_active(),
        }
    }
}

impl Queryable for TopicRow {
    fn fields() -> &'static [&'static str] {
        &["name", "path", "benchmark", "progress"]
    }

    fn field(&self, key: &str) -> FieldValue<'_> {
        match key {
            "name" => self.name.as_str().into(),
            "path" => self.path.as_str().into(),
            "benchmark" => self.benchmark_hours.into(),
            "progress" => self.progress_percent.into(),
            _ => FieldValue::Missing,
        }
    }

    /// Tree order: parents right before their children.
    fn default_order(&self, other: &Self) -> Ordering {
        self.path
            .to_lowercase()
            .cmp(&other.path.to_lowercase())
            .then(self.id.cmp(&other.id))
    }
}

/// One line of an entries table, also used for the entry detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryRow {
    pub id: EntryId,
    pub user_id: UserId,
    pub topic_id: Option<TopicId>,
    /// Topic name, or empty when the entry targets a project or an unknown topic.
    pub topic: String,
    pub project_id: Option<ProjectId>,
    pub hours: f64,
    pub progress_percent: f64,
    pub is_completed: bool,
    pub status: EntryStatus,
    pub ai_status: AiStatus,
    pub date: NaiveDate,
}

impl EntryRow {
    #[must_use]
    pub fn build(entry: &Entry, topics: &TopicService) -> Self {
        let topic = entry
            .topic_id()
            .and_then(|id| topics.topic(id))
            .map(|topic| topic.name().to_owned())
            .unwrap_or_default();
        Self {
            id: entry.id(),
            user_id: entry.user_id(),
            topic_id: entry.topic_id(),
            topic,
            project_id: entry.project_id(),
            hours: entry.hours(),
            progress_percent: entry.progress_percent(),
            is_completed: entry.is_completed(),
            status: entry.status(),
            ai_status: entry.ai_status(),
            date: entry.date(),
        }
    }
}

impl Queryable for EntryRow {
    fn fields() -> &'static [&'static str] {
        &[
            "topic", "project", "user", "status", "ai_status", "hours", "progress", "date",
        ]
    }

    fn field(&self, key: &str) -> FieldValue<'_> {
        match key {
            "topic" if self.topic.is_empty() => FieldValue::Missing,
            "topic" => self.topic.as_str().into(),
            "project" => self.project_id.map(|id| id.to_string()).into(),
            "user" => self.user_id.to_string().into(),
            "status" => self.status.as_str().into(),
            "ai_status" => self.ai_status.as_str().into(),
            "hours" => self.hours.into(),
            "progress" => self.progress_percent.into(),
            "date" => self.date.into(),
            _ => FieldValue::Missing,
        }
    }

    /// Newest first, then highest id.
    fn default_order(&self, other: &Self) -> Ordering {
        other.date.cmp(&self.date).then(other.id.cmp(&self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::model::EntryTarget;
    use tracker_core::time::fixed_today;

    #[test]
    fn entry_row_resolves_topic_names() {
        let topics = TopicService::from_topics(vec![
            Topic::new(TopicId::new(1), None, "Rust", 4.0).unwrap().inactive(),
        ]);
        let entry = Entry::new(
            EntryId::new(1),
            UserId::new(7),
            EntryTarget::Topic(TopicId::new(1)),
            1.0,
            25.0,
            fixed_today(),
        )
        .unwrap();
        let row = EntryRow::build(&entry, &topics);
        assert_eq!(row.topic, "Rust");
        assert_eq!(row.field("status"), FieldValue::from("pending"));
        assert_eq!(row.field("project"), FieldValue::Missing);
    }

    #[test]
    fn topic_row_rounds_for_display() {
        let topics = TopicService::from_topics(vec![
            Topic::new(TopicId::new(1), None, "Rust", 3.333_33).unwrap(),
        ]);
        let topic = topics.topic(TopicId::new(1)).unwrap().clone();
        let row = TopicRow::build(&topic, &topics, None, 1);
        assert_eq!(row.benchmark_hours, 3.3);
        assert_eq!(row.path, "Rust");
    }
}
