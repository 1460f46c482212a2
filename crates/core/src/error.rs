use thiserror::Error;

use crate::graph::GraphError;
use crate::model::{EntryError, TopicError, ViewSettingsError};
use crate::navigation::NavigationError;

/// Any error raised by the domain crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Settings(#[from] ViewSettingsError),
}
