//! Fakes for the scheduler's collaborators

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crawler::{CrawlSource, Crawler, CrawlerConfig, CrawlerError, CrawlerResult, PageFetcher, ReviewPage, SearchResult};
use scheduler::core::Snapshot;
use scheduler::services::MemoryContentStore;
use scheduler::{
    ContentStore, SchedulerResult, SnapshotPublisher, SourceFactory, StoredContent, UnscoredContent, WindowRecord,
};
use shared::{ContentId, Synonym, SynonymSet, TaggedContent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Review site with fixed search results and pages
#[derive(Clone, Default)]
pub struct StaticSite {
    searches: Arc<Mutex<HashMap<String, Vec<SearchResult>>>>,
    pages: Arc<Mutex<HashMap<Url, ReviewPage>>>,
    fetched: Arc<Mutex<Vec<Url>>>,
}

impl StaticSite {
    pub fn with_search(self, term: &str, results: Vec<SearchResult>) -> Self {
        self.searches.lock().unwrap().insert(term.to_string(), results);
        self
    }

    pub fn with_page(self, url: Url, page: ReviewPage) -> Self {
        self.pages.lock().unwrap().insert(url, page);
        self
    }

    pub fn fetched(&self) -> Vec<Url> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticSite {
    async fn fetch_search(&self, term: &str) -> CrawlerResult<Vec<SearchResult>> {
        Ok(self.searches.lock().unwrap().get(term).cloned().unwrap_or_default())
    }

    async fn fetch_page(&self, url: &Url) -> CrawlerResult<ReviewPage> {
        self.fetched.lock().unwrap().push(url.clone());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| CrawlerError::fetch(url.as_str(), "404"))
    }
}

/// Builds started crawlers over a `StaticSite`
pub struct ReviewSiteFactory {
    pub site: StaticSite,
    pub cancel: CancellationToken,
}

impl SourceFactory for ReviewSiteFactory {
    fn name(&self) -> &'static str {
        "reviews"
    }

    fn create(&self) -> SchedulerResult<Box<dyn CrawlSource>> {
        let crawler = Crawler::new(self.site.clone(), CrawlerConfig::default(), self.cancel.child_token());
        crawler.start();
        Ok(Box::new(crawler))
    }
}

/// Publisher that keeps every snapshot it receives
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub published: Arc<Mutex<Vec<Snapshot>>>,
    pub fail: bool,
}

impl RecordingPublisher {
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotPublisher for RecordingPublisher {
    async fn publish(&self, snapshot: &Snapshot) -> SchedulerResult<()> {
        self.published.lock().unwrap().push(snapshot.clone());
        if self.fail {
            Err(scheduler::SchedulerError::service("snapshot", "status 500"))
        } else {
            Ok(())
        }
    }
}

/// In-memory store whose commits take `commit_delay` to complete
pub struct SlowStore {
    inner: MemoryContentStore,
    commit_delay: Duration,
}

impl SlowStore {
    pub fn new(commit_delay: Duration) -> Self {
        Self {
            inner: MemoryContentStore::new(),
            commit_delay,
        }
    }
}

#[async_trait]
impl ContentStore for SlowStore {
    async fn commit(&self, content: TaggedContent) -> SchedulerResult<bool> {
        tokio::time::sleep(self.commit_delay).await;
        self.inner.commit(content).await
    }

    async fn query_unscored(&self) -> SchedulerResult<Vec<UnscoredContent>> {
        self.inner.query_unscored().await
    }

    async fn set_sentiment(&self, id: &ContentId, score: f64) -> SchedulerResult<()> {
        self.inner.set_sentiment(id, score).await
    }

    async fn query_window(
        &self,
        synonym: &Synonym,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SchedulerResult<Vec<WindowRecord>> {
        self.inner.query_window(synonym, from, to).await
    }

    async fn commit_synonyms(&self, synonyms: &SynonymSet) -> SchedulerResult<()> {
        self.inner.commit_synonyms(synonyms).await
    }

    async fn clear_all(&self) -> SchedulerResult<usize> {
        self.inner.clear_all().await
    }

    async fn all_content(&self) -> SchedulerResult<Vec<StoredContent>> {
        self.inner.all_content().await
    }
}
