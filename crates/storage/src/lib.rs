#![forbid(unsafe_code)]

//! Snapshot sources for the tracker: where topics and entries come from.

pub mod records;
pub mod repository;

pub use records::{EntryRecord, MasteryRecord, SnapshotRecord, TopicRecord};
pub use repository::{InMemorySnapshot, SnapshotSource, StorageError};
