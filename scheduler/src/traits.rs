//! Trait definitions for dependency injection
//!
//! Every remote collaborator of the orchestration loop sits behind one of
//! these traits, so the loop can be driven in tests with mockall mocks and
//! in production with the HTTP and in-memory implementations in `services`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crawler::CrawlSource;
use shared::{ContentId, Synonym, SynonymSet, TaggedContent};

use crate::core::Snapshot;
use crate::error::SchedulerResult;
use crate::types::{StoredContent, UnscoredContent, WindowRecord};

/// Authoritative synonym list
#[mockall::automock]
#[async_trait]
pub trait SynonymRegistry: Send + Sync {
    async fn fetch_synonyms(&self) -> SchedulerResult<SynonymSet>;
}

/// Batch sentiment scoring
#[mockall::automock]
#[async_trait]
pub trait SentimentService: Send + Sync {
    /// One score in [0, 1] per body, in request order
    async fn score(&self, bodies: Vec<String>) -> SchedulerResult<Vec<f64>>;
}

/// Keyword extraction over a batch of bodies
#[mockall::automock]
#[async_trait]
pub trait KeywordService: Send + Sync {
    async fn extract(&self, bodies: Vec<String>) -> SchedulerResult<Vec<String>>;
}

/// Remote snapshot aggregator
#[mockall::automock]
#[async_trait]
pub trait SnapshotPublisher: Send + Sync {
    async fn publish(&self, snapshot: &Snapshot) -> SchedulerResult<()>;
}

/// Content persistence
///
/// Must be safe under concurrent writers; `commit` is idempotent on the
/// content identifier.
#[mockall::automock]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a record; `false` if its identifier was already present
    async fn commit(&self, content: TaggedContent) -> SchedulerResult<bool>;

    async fn query_unscored(&self) -> SchedulerResult<Vec<UnscoredContent>>;

    /// Set a record's score; an already-scored record keeps its first score
    async fn set_sentiment(&self, id: &ContentId, score: f64) -> SchedulerResult<()>;

    /// Records for `synonym` authored in `[from, to)`
    async fn query_window(
        &self,
        synonym: &Synonym,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SchedulerResult<Vec<WindowRecord>>;

    async fn commit_synonyms(&self, synonyms: &SynonymSet) -> SchedulerResult<()>;

    /// Remove every record; returns how many were removed
    async fn clear_all(&self) -> SchedulerResult<usize>;

    async fn all_content(&self) -> SchedulerResult<Vec<StoredContent>>;
}

/// Builds fresh, already-started crawl sources
#[mockall::automock]
pub trait SourceFactory: Send + Sync {
    fn name(&self) -> &'static str;

    fn create(&self) -> SchedulerResult<Box<dyn CrawlSource>>;
}
