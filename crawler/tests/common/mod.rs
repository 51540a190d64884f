//! Shared fixtures and fakes for crawler integration tests

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::ScriptedFetcher;
