//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;
use tracker_core::graph::GraphError;
use tracker_core::model::{EntryId, TopicId};
use tracker_core::navigation::NavigationError;

/// Errors emitted by `TopicService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TopicServiceError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ReviewNavigator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NavigatorError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("topic {0} does not exist")]
    UnknownTopic(TopicId),
    #[error("topic {0} is inactive")]
    InactiveTopic(TopicId),
    #[error("entry {0} does not exist")]
    UnknownEntry(EntryId),
    #[error("the review view is closed")]
    Closed,
    #[error(transparent)]
    Snapshot(#[from] TopicServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
