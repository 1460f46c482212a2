#![forbid(unsafe_code)]

//! Topic aggregation and drill-down navigation for the learner activity
//! tracker.

pub mod aggregate;
pub mod error;
pub mod graph;
pub mod model;
pub mod navigation;
pub mod query;
pub mod time;

pub use error::Error;
pub use time::Clock;
