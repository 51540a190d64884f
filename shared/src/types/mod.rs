//! Core types used throughout the ingestion system

use serde::{Deserialize, Serialize};
use std::fmt;

mod content;
mod synonym;

pub use content::{AuthorId, Content, ContentId, FeedEntryKind, SourceMetadata, TaggedContent};
pub use synonym::{Synonym, SynonymSet};

/// Identifier for any long-lived worker in the system
///
/// Every worker logs under one of these names so interleaved output from the
/// parallel loops can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerId {
    /// Orchestration loop
    Scheduler,
    /// Primary-source frontier worker
    Crawler,
    /// Feed sub-stream carrying new items
    FeedItems,
    /// Feed sub-stream carrying new comments
    FeedComments,
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerId::Scheduler => write!(f, "scheduler"),
            WorkerId::Crawler => write!(f, "crawler"),
            WorkerId::FeedItems => write!(f, "feed_items"),
            WorkerId::FeedComments => write!(f, "feed_comments"),
        }
    }
}

/// Content source a record was scraped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Review site crawled per synonym
    Reviews,
    /// Social discussion feed matched against every synonym
    Feed,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Reviews => "reviews",
            SourceKind::Feed => "feed",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reviews" | "review" => Ok(SourceKind::Reviews),
            "feed" => Ok(SourceKind::Feed),
            _ => Err(format!("Unknown source: {s}")),
        }
    }
}
