//! Common fakes and fixtures for scheduler integration tests

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{RecordingPublisher, ReviewSiteFactory, SlowStore, StaticSite};
