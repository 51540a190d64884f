//! Pure scheduling logic: snapshot aggregation and window bookkeeping

pub mod snapshot;
pub mod watermark;

pub use snapshot::{average, build_snapshot, partition, CategoryStats, SentimentCategory, Snapshot};
pub use watermark::Watermark;
