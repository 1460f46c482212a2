use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::TopicId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic name cannot be empty")]
    EmptyName,

    #[error("benchmark hours must be finite and >= 0, got {provided}")]
    InvalidBenchmark { provided: f64 },

    #[error("mastery progress must be within 0..=100, got {provided}")]
    InvalidProgress { provided: f64 },

    #[error("topic {0} cannot be its own parent")]
    SelfParent(TopicId),
}

//
// ─── MASTERY ───────────────────────────────────────────────────────────────────
//

/// A learner's progress record for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mastery {
    progress: f64,
    is_locked: bool,
    lock_reason: Option<String>,
    #[serde(default)]
    total_hours: f64,
}

impl Mastery {
    /// Creates an unlocked mastery record.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::InvalidProgress` if `progress` is outside `0..=100`.
    pub fn new(progress: f64) -> Result<Self, TopicError> {
        if !progress.is_finite() || !(0.0..=100.0).contains(&progress) {
            return Err(TopicError::InvalidProgress { provided: progress });
        }
        Ok(Self {
            progress,
            is_locked: false,
            lock_reason: None,
            total_hours: 0.0,
        })
    }

    /// Rehydrate a stored record.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::InvalidProgress` if `progress` is outside `0..=100`.
    pub fn from_persisted(
        progress: f64,
        is_locked: bool,
        lock_reason: Option<String>,
        total_hours: f64,
    ) -> Result<Self, TopicError> {
        let mut mastery = Self::new(progress)?;
        mastery.is_locked = is_locked;
        mastery.lock_reason = lock_reason;
        mastery.total_hours = if total_hours.is_finite() {
            total_hours.max(0.0)
        } else {
            0.0
        };
        Ok(mastery)
    }

    /// An unlocked record with `progress` forced into `0..=100` (NaN becomes 0).
    #[must_use]
    pub fn clamped(progress: f64) -> Self {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 100.0)
        };
        Self {
            progress,
            is_locked: false,
            lock_reason: None,
            total_hours: 0.0,
        }
    }

    /// A mastered (100%, locked) record.
    #[must_use]
    pub fn mastered(reason: impl Into<String>) -> Self {
        Self {
            progress: 100.0,
            is_locked: true,
            lock_reason: Some(reason.into()),
            total_hours: 0.0,
        }
    }

    #[must_use]
    pub fn locked(mut self, reason: impl Into<String>) -> Self {
        self.is_locked = true;
        self.lock_reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_total_hours(mut self, hours: f64) -> Self {
        self.total_hours = hours;
        self
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    #[must_use]
    pub fn lock_reason(&self) -> Option<&str> {
        self.lock_reason.as_deref()
    }

    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.total_hours
    }
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// A node in the learning topic forest.
///
/// Topics are read-only inputs: administrators create and edit them elsewhere,
/// and the aggregation engine only ever reads a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    id: TopicId,
    parent_id: Option<TopicId>,
    name: String,
    benchmark_hours: f64,
    is_active: bool,
    mastery: Option<Mastery>,
}

impl Topic {
    /// Creates an active topic without mastery.
    ///
    /// # Errors
    ///
    /// Returns `TopicError` if the name is blank, the benchmark is negative or
    /// not finite, or the topic names itself as parent.
    pub fn new(
        id: TopicId,
        parent_id: Option<TopicId>,
        name: impl Into<String>,
        benchmark_hours: f64,
    ) -> Result<Self, TopicError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(TopicError::EmptyName);
        }
        if !benchmark_hours.is_finite() || benchmark_hours < 0.0 {
            return Err(TopicError::InvalidBenchmark {
                provided: benchmark_hours,
            });
        }
        if parent_id == Some(id) {
            return Err(TopicError::SelfParent(id));
        }
        Ok(Self {
            id,
            parent_id,
            name,
            benchmark_hours,
            is_active: true,
            mastery: None,
        })
    }

    /// Rehydrate a topic from an external snapshot without validation.
    ///
    /// Snapshots can carry malformed parent links (including self-parents);
    /// `TopicGraph::build` is the place that rejects them.
    #[must_use]
    pub fn from_snapshot(
        id: TopicId,
        parent_id: Option<TopicId>,
        name: String,
        benchmark_hours: f64,
        is_active: bool,
        mastery: Option<Mastery>,
    ) -> Self {
        Self {
            id,
            parent_id,
            name,
            benchmark_hours,
            is_active,
            mastery,
        }
    }

    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    #[must_use]
    pub fn with_mastery(mut self, mastery: Option<Mastery>) -> Self {
        self.mastery = mastery;
        self
    }

    pub(crate) fn detach_parent(&mut self) {
        self.parent_id = None;
    }

    #[must_use]
    pub fn id(&self) -> TopicId {
        self.id
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<TopicId> {
        self.parent_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn benchmark_hours(&self) -> f64 {
        self.benchmark_hours
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn mastery(&self) -> Option<&Mastery> {
        self.mastery.as_ref()
    }

    /// Stored mastery progress, with absent mastery counted as 0.
    #[must_use]
    pub fn stored_progress(&self) -> f64 {
        self.mastery.as_ref().map_or(0.0, Mastery::progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_name() {
        let topic = Topic::new(TopicId::new(1), None, "  Rust  ", 4.0).unwrap();
        assert_eq!(topic.name(), "Rust");
        assert!(topic.is_active());
        assert!(topic.mastery().is_none());
    }

    #[test]
    fn new_rejects_negative_benchmark() {
        let err = Topic::new(TopicId::new(1), None, "Rust", -1.0).unwrap_err();
        assert_eq!(err, TopicError::InvalidBenchmark { provided: -1.0 });
    }

    #[test]
    fn new_rejects_self_parent() {
        let id = TopicId::new(3);
        let err = Topic::new(id, Some(id), "Loop", 1.0).unwrap_err();
        assert_eq!(err, TopicError::SelfParent(id));
    }

    #[test]
    fn stored_progress_defaults_to_zero() {
        let topic = Topic::new(TopicId::new(1), None, "CSS", 5.0).unwrap();
        assert_eq!(topic.stored_progress(), 0.0);

        let topic = topic.with_mastery(Some(Mastery::new(35.0).unwrap()));
        assert_eq!(topic.stored_progress(), 35.0);
    }

    #[test]
    fn mastery_rejects_out_of_range() {
        assert!(Mastery::new(100.5).is_err());
        assert!(Mastery::new(f64::NAN).is_err());
        assert!(Mastery::new(0.0).is_ok());
    }

    #[test]
    fn clamped_forces_range() {
        assert_eq!(Mastery::clamped(140.0).progress(), 100.0);
        assert_eq!(Mastery::clamped(f64::NAN).progress(), 0.0);
        assert!(!Mastery::clamped(100.0).is_locked());
    }
}
