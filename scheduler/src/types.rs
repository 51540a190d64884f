//! Scheduler data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared::{Content, ContentId, SynonymSet};

/// A stored content record with every synonym it has been associated with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredContent {
    pub content: Content,
    pub synonyms: SynonymSet,
}

/// Content awaiting a sentiment score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnscoredContent {
    pub id: ContentId,
    pub body: String,
}

/// One record returned by a window query
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRecord {
    pub id: ContentId,
    pub body: String,
    pub authored_at: DateTime<Utc>,
    pub sentiment: Option<f64>,
}

/// What one orchestration cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// The tracked set changed and was propagated
    pub synonyms_changed: bool,
    pub drained: usize,
    /// Records that were new to the store
    pub committed: usize,
    pub scored: usize,
    /// Snapshots published in this cycle's window pass, if one was due
    pub window_pass: Option<usize>,
}
