//! Orchestration for the synonym tracker
//!
//! The scheduler owns the crawl sources, moves their output into the content
//! store, drives sentiment scoring and publishes windowed snapshots.

pub mod config;
pub mod core;
pub mod error;
pub mod scheduler;
pub mod services;
pub mod supervisor;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::scheduler::{Scheduler, SchedulerSettings};
pub use config::{Endpoints, SchedulerConfig};
pub use error::{SchedulerError, SchedulerResult};
pub use supervisor::SupervisedSource;
pub use traits::*;
pub use types::*;
