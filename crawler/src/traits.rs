//! Crawler trait definitions for dependency injection
//!
//! `PageFetcher` and `FeedClient` are the external collaborators that talk to
//! the content sources; `CrawlSource` is the seam the scheduler drives both
//! sources through.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use url::Url;

use shared::{SynonymSet, TaggedContent};

use crate::error::CrawlerResult;
use crate::types::{FeedStream, RawFeedEntry, ReviewPage, SearchResult};

/// Review-site page fetch and extraction
#[mockall::automock]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Run a term search and return every result with its visible label
    async fn fetch_search(&self, term: &str) -> CrawlerResult<Vec<SearchResult>>;

    /// Fetch one review page and extract its records and "next page" link
    async fn fetch_page(&self, url: &Url) -> CrawlerResult<ReviewPage>;
}

/// Push-style feed of new entries
#[mockall::automock]
pub trait FeedClient: Send + Sync {
    /// Open one of the infinite sub-streams
    fn stream(&self, stream: FeedStream) -> BoxStream<'static, CrawlerResult<RawFeedEntry>>;
}

/// A running content source the scheduler can reconfigure and drain
#[mockall::automock]
#[async_trait]
pub trait CrawlSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Replace the tracked synonym set
    ///
    /// Fails only with a structural error when the source can no longer make
    /// progress and must be recreated.
    async fn use_synonyms(&self, synonyms: &SynonymSet) -> CrawlerResult<()>;

    /// Take and clear everything produced since the last drain
    fn drain(&self) -> Vec<TaggedContent>;

    /// Whether the source's workers are still alive
    fn is_running(&self) -> bool;

    /// Cancel the source's workers and wait for them to stop
    async fn shutdown(&self);
}
