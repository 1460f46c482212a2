use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracker_core::model::{
    AiStatus, Entry, EntryError, EntryId, EntryStatus, Mastery, ProjectId, Topic, TopicError,
    TopicId, UserId,
};

/// Wire shape of a learner's mastery of one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryRecord {
    pub progress: f64,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub lock_reason: Option<String>,
    #[serde(default)]
    pub total_hours: f64,
}

impl MasteryRecord {
    #[must_use]
    pub fn from_mastery(mastery: &Mastery) -> Self {
        Self {
            progress: mastery.progress(),
            is_locked: mastery.is_locked(),
            lock_reason: mastery.lock_reason().map(str::to_owned),
            total_hours: mastery.total_hours(),
        }
    }

    /// # Errors
    ///
    /// Returns `TopicError::InvalidProgress` if the progress is out of range.
    pub fn into_mastery(self) -> Result<Mastery, TopicError> {
        Mastery::from_persisted(
            self.progress,
            self.is_locked,
            self.lock_reason,
            self.total_hours,
        )
    }
}

/// Wire shape of a topic as returned by the topics API.
///
/// Parent links are kept as-is: dangling, self or cyclic parents are the
/// graph build's concern, not the record's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: TopicId,
    #[serde(default)]
    pub parent_id: Option<TopicId>,
    pub name: String,
    #[serde(default)]
    pub benchmark_hours: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub mastery: Option<MasteryRecord>,
}

fn default_active() -> bool {
    true
}

impl TopicRecord {
    #[must_use]
    pub fn from_topic(topic: &Topic) -> Self {
        Self {
            id: topic.id(),
            parent_id: topic.parent_id(),
            name: topic.name().to_owned(),
            benchmark_hours: topic.benchmark_hours(),
            is_active: topic.is_active(),
            mastery: topic.mastery().map(MasteryRecord::from_mastery),
        }
    }

    /// Convert the record into a domain `Topic`.
    ///
    /// # Errors
    ///
    /// Returns `TopicError` if the name is blank, the benchmark is negative or
    /// the mastery progress is out of range.
    pub fn into_topic(self) -> Result<Topic, TopicError> {
        // Validate name and benchmark without the parent so that self-parents
        // reach the graph build and surface as cycles there.
        let checked = Topic::new(self.id, None, self.name, self.benchmark_hours)?;
        let mastery = self.mastery.map(MasteryRecord::into_mastery).transpose()?;
        Ok(Topic::from_snapshot(
            checked.id(),
            self.parent_id,
            checked.name().to_owned(),
            checked.benchmark_hours(),
            self.is_active,
            mastery,
        ))
    }
}

/// Wire shape of a logged entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: EntryId,
    pub user_id: UserId,
    #[serde(default)]
    pub topic_id: Option<TopicId>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    pub hours: f64,
    #[serde(default)]
    pub progress_percent: f64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default = "default_status")]
    pub status: EntryStatus,
    #[serde(default = "default_ai_status")]
    pub ai_status: AiStatus,
    pub date: NaiveDate,
}

fn default_status() -> EntryStatus {
    EntryStatus::Pending
}

fn default_ai_status() -> AiStatus {
    AiStatus::Pending
}

impl EntryRecord {
    #[must_use]
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            id: entry.id(),
            user_id: entry.user_id(),
            topic_id: entry.topic_id(),
            project_id: entry.project_id(),
            hours: entry.hours(),
            progress_percent: entry.progress_percent(),
            is_completed: entry.is_completed(),
            status: entry.status(),
            ai_status: entry.ai_status(),
            date: entry.date(),
        }
    }

    /// Convert the record into a domain `Entry`.
    ///
    /// # Errors
    ///
    /// Returns `EntryError` if both or neither targets are set, or the numbers
    /// are out of range.
    pub fn into_entry(self) -> Result<Entry, EntryError> {
        Entry::from_parts(
            self.id,
            self.user_id,
            self.topic_id,
            self.project_id,
            self.hours,
            self.progress_percent,
            self.is_completed,
            self.status,
            self.ai_status,
            self.date,
        )
    }
}

/// A full snapshot document: every topic and entry visible to one reviewer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotRecord {
    #[serde(default)]
    pub topics: Vec<TopicRecord>,
    #[serde(default)]
    pub entries: Vec<EntryRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::time::fixed_today;

    #[test]
    fn topic_record_keeps_self_parent_for_the_graph() {
        let record = TopicRecord {
            id: TopicId::new(3),
            parent_id: Some(TopicId::new(3)),
            name: " Loop ".into(),
            benchmark_hours: 2.0,
            is_active: true,
            mastery: None,
        };
        let topic = record.into_topic().unwrap();
        assert_eq!(topic.parent_id(), Some(TopicId::new(3)));
        assert_eq!(topic.name(), "Loop");
    }

    #[test]
    fn topic_record_rejects_negative_benchmark() {
        let record = TopicRecord {
            id: TopicId::new(1),
            parent_id: None,
            name: "Rust".into(),
            benchmark_hours: -1.0,
            is_active: true,
            mastery: None,
        };
        assert!(matches!(
            record.into_topic(),
            Err(TopicError::InvalidBenchmark { .. })
        ));
    }

    #[test]
    fn mastery_record_rejects_out_of_range_progress() {
        let record = MasteryRecord {
            progress: 140.0,
            is_locked: false,
            lock_reason: None,
            total_hours: 0.0,
        };
        assert!(record.into_mastery().is_err());
    }

    #[test]
    fn entry_record_requires_exactly_one_target() {
        let record = EntryRecord {
            id: EntryId::new(9),
            user_id: UserId::new(1),
            topic_id: Some(TopicId::new(1)),
            project_id: Some(ProjectId::new(2)),
            hours: 1.0,
            progress_percent: 10.0,
            is_completed: false,
            status: EntryStatus::Pending,
            ai_status: AiStatus::Pending,
            date: fixed_today(),
        };
        assert_eq!(
            record.into_entry(),
            Err(EntryError::TargetConflict(EntryId::new(9)))
        );
    }
}
