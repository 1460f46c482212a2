use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracker_core::model::{Entry, Topic};

use crate::records::{EntryRecord, SnapshotRecord, TopicRecord};

/// Errors surfaced by snapshot sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Where the current topic/entry snapshot comes from.
///
/// Implementations return flat lists in any order; hierarchy and aggregation
/// are built on top by the caller.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch every topic, active or not.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn fetch_topics(&self) -> Result<Vec<Topic>, StorageError>;

    /// Fetch every visible entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    async fn fetch_entries(&self) -> Result<Vec<Entry>, StorageError>;
}

/// In-memory snapshot, loaded from a JSON document or filled by tests.
#[derive(Clone, Default)]
pub struct InMemorySnapshot {
    topics: Arc<Mutex<Vec<Topic>>>,
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl InMemorySnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_data(topics: Vec<Topic>, entries: Vec<Entry>) -> Self {
        Self {
            topics: Arc::new(Mutex::new(topics)),
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Parse a snapshot document into validated domain values.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the document is malformed or
    /// any row fails validation.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        let record: SnapshotRecord =
            serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let topics = record
            .topics
            .into_iter()
            .map(|topic| {
                let id = topic.id;
                topic
                    .into_topic()
                    .map_err(|e| StorageError::Serialization(format!("topic {id}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let entries = record
            .entries
            .into_iter()
            .map(|entry| {
                let id = entry.id;
                entry
                    .into_entry()
                    .map_err(|e| StorageError::Serialization(format!("entry {id}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::with_data(topics, entries))
    }

    /// Serialize the current contents as a snapshot document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a lock is poisoned or encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        let record = SnapshotRecord {
            topics: self
                .lock_topics()?
                .iter()
                .map(TopicRecord::from_topic)
                .collect(),
            entries: self
                .lock_entries()?
                .iter()
                .map(EntryRecord::from_entry)
                .collect(),
        };
        serde_json::to_string_pretty(&record).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Swap in a new topic list; the next fetch sees it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn replace_topics(&self, topics: Vec<Topic>) -> Result<(), StorageError> {
        *self.lock_topics()? = topics;
        Ok(())
    }

    /// Swap in a new entry list; the next fetch sees it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn replace_entries(&self, entries: Vec<Entry>) -> Result<(), StorageError> {
        *self.lock_entries()? = entries;
        Ok(())
    }

    fn lock_topics(&self) -> Result<std::sync::MutexGuard<'_, Vec<Topic>>, StorageError> {
        self.topics
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn lock_entries(&self) -> Result<std::sync::MutexGuard<'_, Vec<Entry>>, StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl SnapshotSource for InMemorySnapshot {
    async fn fetch_topics(&self) -> Result<Vec<Topic>, StorageError> {
        Ok(self.lock_topics()?.clone())
    }

    async fn fetch_entries(&self) -> Result<Vec<Entry>, StorageError> {
        Ok(self.lock_entries()?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::model::TopicId;

    fn topic(id: u64, parent: Option<u64>, name: &str) -> Topic {
        Topic::new(TopicId::new(id), parent.map(TopicId::new), name, 1.0).unwrap()
    }

    #[tokio::test]
    async fn replace_is_visible_to_clones() {
        let source = InMemorySnapshot::new();
        let shared = source.clone();
        source
            .replace_topics(vec![topic(1, None, "Frontend"), topic(2, Some(1), "React")])
            .unwrap();

        let fetched = shared.fetch_topics().await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert!(shared.fetch_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn from_json_rejects_bad_rows() {
        let raw = r#"{
            "topics": [{ "id": 1, "name": "   ", "benchmark_hours": 3.0 }]
        }"#;
        let err = InMemorySnapshot::from_json(raw).err().unwrap();
        assert!(matches!(err, StorageError::Serialization(msg) if msg.starts_with("topic 1")));
    }

    #[tokio::test]
    async fn from_json_rejects_malformed_document() {
        let err = InMemorySnapshot::from_json("{ not json").err().unwrap();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
