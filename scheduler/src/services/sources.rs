//! Factories for the two production crawl sources
//!
//! Every source gets a child of the scheduler's cancellation token, so a
//! rebuilt source can be shut down on its own while a process-wide shutdown
//! still reaches all of them. A rebuilt feed client resumes from the cursors
//! of the one it replaces.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crawler::{CrawlSource, Crawler, CrawlerConfig, FeedCursors, FeedScraper, HttpFeedClient, HttpPageFetcher};
use shared::RestartPolicy;

use crate::error::SchedulerResult;
use crate::traits::SourceFactory;

pub struct ReviewSourceFactory {
    base_url: String,
    config: CrawlerConfig,
    http_timeout: Duration,
    cancel: CancellationToken,
}

impl ReviewSourceFactory {
    pub fn new(
        base_url: impl Into<String>,
        config: CrawlerConfig,
        http_timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            config,
            http_timeout,
            cancel,
        }
    }
}

impl SourceFactory for ReviewSourceFactory {
    fn name(&self) -> &'static str {
        "reviews"
    }

    fn create(&self) -> SchedulerResult<Box<dyn CrawlSource>> {
        let fetcher = HttpPageFetcher::new(&self.base_url, self.http_timeout)?;
        let crawler = Crawler::new(fetcher, self.config.clone(), self.cancel.child_token());
        crawler.start();
        Ok(Box::new(crawler))
    }
}

pub struct FeedSourceFactory {
    base_url: String,
    poll_interval: Duration,
    http_timeout: Duration,
    restart_policy: RestartPolicy,
    cursors: FeedCursors,
    cancel: CancellationToken,
}

impl FeedSourceFactory {
    pub fn new(
        base_url: impl Into<String>,
        poll_interval: Duration,
        http_timeout: Duration,
        restart_policy: RestartPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            poll_interval,
            http_timeout,
            restart_policy,
            cursors: FeedCursors::default(),
            cancel,
        }
    }
}

impl SourceFactory for FeedSourceFactory {
    fn name(&self) -> &'static str {
        "feed"
    }

    fn create(&self) -> SchedulerResult<Box<dyn CrawlSource>> {
        let client = HttpFeedClient::new(&self.base_url, self.poll_interval, self.http_timeout)?
            .with_cursors(self.cursors.clone());
        let scraper = FeedScraper::new(client, self.restart_policy.clone(), self.cancel.child_token());
        scraper.start();
        Ok(Box::new(scraper))
    }
}
