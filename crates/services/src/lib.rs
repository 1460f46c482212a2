#![forbid(unsafe_code)]

pub mod error;
pub mod navigator;
pub mod rows;
pub mod topic_service;

pub use tracker_core::Clock;

pub use error::{NavigatorError, TopicServiceError};
pub use navigator::{FrameRows, RenderedFrame, ReviewNavigator};
pub use rows::{EntryRow, TopicRow};
pub use topic_service::{PATH_SEPARATOR, TopicService};
