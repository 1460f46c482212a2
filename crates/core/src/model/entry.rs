use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{EntryId, ProjectId, TopicId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EntryError {
    #[error("entry {0} references both a topic and a project")]
    TargetConflict(EntryId),

    #[error("entry {0} references neither a topic nor a project")]
    MissingTarget(EntryId),

    #[error("hours must be finite and >= 0, got {provided}")]
    InvalidHours { provided: f64 },

    #[error("progress percent must be within 0..=100, got {provided}")]
    InvalidProgress { provided: f64 },

    #[error("unknown entry status: {0}")]
    UnknownStatus(String),

    #[error("unknown AI status: {0}")]
    UnknownAiStatus(String),
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Review state assigned to an entry by an administrator (or the AI pipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Flagged,
    Approved,
    Rejected,
}

impl EntryStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Flagged => "flagged",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses the wire value used by the entries API.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::UnknownStatus` for anything else.
    pub fn parse(value: &str) -> Result<Self, EntryError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "flagged" => Ok(Self::Flagged),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(EntryError::UnknownStatus(value.to_owned())),
        }
    }
}

/// Outcome of the external AI analysis pipeline; consumed for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiStatus {
    Pending,
    Analyzed,
    Error,
    Timeout,
}

impl AiStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Analyzed => "analyzed",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }

    /// # Errors
    ///
    /// Returns `EntryError::UnknownAiStatus` for unrecognised values.
    pub fn parse(value: &str) -> Result<Self, EntryError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "analyzed" => Ok(Self::Analyzed),
            "error" => Ok(Self::Error),
            "timeout" => Ok(Self::Timeout),
            _ => Err(EntryError::UnknownAiStatus(value.to_owned())),
        }
    }
}

/// What an entry logs time against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryTarget {
    Topic(TopicId),
    Project(ProjectId),
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// One logged learning activity.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    id: EntryId,
    user_id: UserId,
    target: EntryTarget,
    hours: f64,
    progress_percent: f64,
    is_completed: bool,
    status: EntryStatus,
    ai_status: AiStatus,
    date: NaiveDate,
}

impl Entry {
    /// Creates a pending entry against a topic or a project.
    ///
    /// # Errors
    ///
    /// Returns `EntryError` when the numeric fields are out of range.
    pub fn new(
        id: EntryId,
        user_id: UserId,
        target: EntryTarget,
        hours: f64,
        progress_percent: f64,
        date: NaiveDate,
    ) -> Result<Self, EntryError> {
        let (topic_id, project_id) = match target {
            EntryTarget::Topic(topic) => (Some(topic), None),
            EntryTarget::Project(project) => (None, Some(project)),
        };
        Self::from_parts(
            id,
            user_id,
            topic_id,
            project_id,
            hours,
            progress_percent,
            false,
            EntryStatus::Pending,
            AiStatus::Pending,
            date,
        )
    }

    /// Validate raw fields as supplied by the entries API.
    ///
    /// # Errors
    ///
    /// Returns `EntryError` if both or neither targets are set, or the numeric
    /// fields are out of range.
    #[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
    pub fn from_parts(
        id: EntryId,
        user_id: UserId,
        topic_id: Option<TopicId>,
        project_id: Option<ProjectId>,
        hours: f64,
        progress_percent: f64,
        is_completed: bool,
        status: EntryStatus,
        ai_status: AiStatus,
        date: NaiveDate,
    ) -> Result<Self, EntryError> {
        let target = match (topic_id, project_id) {
            (Some(_), Some(_)) => return Err(EntryError::TargetConflict(id)),
            (None, None) => return Err(EntryError::MissingTarget(id)),
            (Some(topic), None) => EntryTarget::Topic(topic),
            (None, Some(project)) => EntryTarget::Project(project),
        };
        if !hours.is_finite() || hours < 0.0 {
            return Err(EntryError::InvalidHours { provided: hours });
        }
        if !progress_percent.is_finite() || !(0.0..=100.0).contains(&progress_percent) {
            return Err(EntryError::InvalidProgress {
                provided: progress_percent,
            });
        }
        Ok(Self {
            id,
            user_id,
            target,
            hours,
            progress_percent,
            is_completed,
            status,
            ai_status,
            date,
        })
    }

    #[must_use]
    pub fn completed(mut self) -> Self {
        self.is_completed = true;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_ai_status(mut self, ai_status: AiStatus) -> Self {
        self.ai_status = ai_status;
        self
    }

    #[must_use]
    pub fn id(&self) -> EntryId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn topic_id(&self) -> Option<TopicId> {
        match self.target {
            EntryTarget::Topic(topic) => Some(topic),
            EntryTarget::Project(_) => None,
        }
    }

    #[must_use]
    pub fn project_id(&self) -> Option<ProjectId> {
        match self.target {
            EntryTarget::Project(project) => Some(project),
            EntryTarget::Topic(_) => None,
        }
    }

    #[must_use]
    pub fn target(&self) -> EntryTarget {
        self.target
    }

    #[must_use]
    pub fn hours(&self) -> f64 {
        self.hours
    }

    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn status(&self) -> EntryStatus {
        self.status
    }

    #[must_use]
    pub fn ai_status(&self) -> AiStatus {
        self.ai_status
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}
