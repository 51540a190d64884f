//! Crawler core building blocks
//!
//! Pure state containers with no I/O: the frontier engine, the politeness
//! clock, the dedup index, the output buffer and the matching rules.

pub mod buffer;
pub mod dedup;
pub mod frontier;
pub mod frontier_scheduler;
pub mod matching;
pub mod politeness;
pub mod relevance;

pub use buffer::OutputBuffer;
pub use dedup::{DedupIndex, Observation};
pub use frontier::Frontier;
pub use frontier_scheduler::FrontierScheduler;
pub use matching::{tokenize, SynonymMatcher};
pub use politeness::{PolitenessGate, DEFAULT_POLITENESS_INTERVAL};
pub use relevance::{filter_relevant, is_relevant};
