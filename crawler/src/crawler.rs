//! Primary-source crawler: one frontier worker against one review host
//!
//! Each step of the worker loop:
//! 1. dequeue the head frontier (blocks while none is queued);
//! 2. if it is empty, reseed it from a term search and requeue it;
//! 3. otherwise take one URL, wait on the politeness gate and fetch the page;
//! 4. buffer every record not yet seen for (synonym, date, author); the first
//!    already-seen record means the rest of the chain was ingested before, so
//!    the page's "next" link is dropped;
//! 5. queue the "next" link if pagination continues;
//! 6. requeue the frontier at the tail, whether it advanced or not.
//!
//! The loop runs under the restart-with-backoff supervisor, so a bad page or a
//! network failure costs a backoff delay, never the worker.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use shared::{
    supervise, worker_debug, worker_info, worker_warn, AuthorId, Content, ContentId, RestartPolicy,
    SourceKind, SourceMetadata, Synonym, SynonymSet, TaggedContent, WorkerId,
};

use crate::core::{
    filter_relevant, DedupIndex, Frontier, FrontierScheduler, Observation, OutputBuffer, PolitenessGate,
    DEFAULT_POLITENESS_INTERVAL,
};
use crate::error::{CrawlerError, CrawlerResult};
use crate::traits::{CrawlSource, PageFetcher};
use crate::types::ReviewRecord;

const SOURCE_NAME: &str = "reviews";

/// How long (synonym, date, author) observations are remembered
pub const DEFAULT_DEDUP_RETENTION: Duration = Duration::from_secs(30 * 24 * 3600);

/// Crawler tuning
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub politeness_interval: Duration,
    /// Dedup entries for review dates older than this are pruned on reseed
    pub dedup_retention: Duration,
    pub restart_policy: RestartPolicy,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            politeness_interval: DEFAULT_POLITENESS_INTERVAL,
            dedup_retention: DEFAULT_DEDUP_RETENTION,
            restart_policy: RestartPolicy::default(),
        }
    }
}

/// What one worker step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// An exhausted frontier was refilled from a term search
    Reseeded { synonym: Synonym, urls: usize },
    /// One page was fetched
    Fetched {
        synonym: Synonym,
        url: Url,
        new_records: usize,
        /// Whether the page's "next" link was queued
        paginated: bool,
    },
}

/// State shared between the crawler handle and its worker task
struct CrawlerInner<F> {
    fetcher: F,
    gate: PolitenessGate,
    frontiers: FrontierScheduler,
    dedup: Mutex<DedupIndex>,
    buffer: OutputBuffer<TaggedContent>,
    dedup_retention: chrono::Duration,
    restart_policy: RestartPolicy,
}

/// Review-site crawler with a single supervised frontier worker
pub struct Crawler<F>
where
    F: PageFetcher + 'static,
{
    inner: Arc<CrawlerInner<F>>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<F> Crawler<F>
where
    F: PageFetcher + 'static,
{
    /// Create a crawler whose worker stops when `cancel` fires
    pub fn new(fetcher: F, config: CrawlerConfig, cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::new(CrawlerInner {
                fetcher,
                gate: PolitenessGate::new(config.politeness_interval),
                frontiers: FrontierScheduler::new(),
                dedup: Mutex::new(DedupIndex::new()),
                buffer: OutputBuffer::new(),
                dedup_retention: chrono::Duration::from_std(config.dedup_retention)
                    .unwrap_or(chrono::Duration::MAX),
                restart_policy: config.restart_policy,
            }),
            cancel,
            worker: Mutex::new(None),
        }
    }

    fn worker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn the frontier worker; a second call is a no-op
    pub fn start(&self) {
        let mut worker = self.worker();
        if worker.is_some() {
            return;
        }

        let inner = self.inner.clone();
        let cancel = self.cancel.clone();
        *worker = Some(tokio::spawn(async move {
            worker_info!(WorkerId::Crawler, "🕷️ Frontier worker started");
            let exit = supervise(WorkerId::Crawler, &inner.restart_policy, &cancel, || {
                let inner = inner.clone();
                let cancel = cancel.clone();
                async move { inner.crawl_loop(&cancel).await }
            })
            .await;
            worker_info!(WorkerId::Crawler, "Frontier worker stopped ({:?})", exit);
        }));
    }

    /// Run a single worker step in the caller's task
    pub async fn step(&self) -> CrawlerResult<StepOutcome> {
        self.inner.step(&self.cancel).await
    }

    pub fn tracked(&self) -> SynonymSet {
        self.inner.frontiers.tracked()
    }

    /// Queued frontiers (a checked-out frontier is not counted)
    pub fn queued_frontiers(&self) -> usize {
        self.inner.frontiers.len()
    }

    pub fn buffered(&self) -> usize {
        self.inner.buffer.len()
    }

    fn worker_exited(&self) -> bool {
        self.worker().as_ref().is_some_and(JoinHandle::is_finished)
    }
}

impl<F> CrawlerInner<F>
where
    F: PageFetcher + 'static,
{
    async fn crawl_loop(&self, cancel: &CancellationToken) -> CrawlerResult<()> {
        loop {
            match self.step(cancel).await {
                Ok(outcome) => worker_debug!(WorkerId::Crawler, "Step: {:?}", outcome),
                Err(CrawlerError::Cancelled) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    async fn step(&self, cancel: &CancellationToken) -> CrawlerResult<StepOutcome> {
        let mut frontier = self.frontiers.dequeue(cancel).await?;
        let synonym = frontier.tag().clone();

        let Some(url) = frontier.take() else {
            return self.reseed(frontier, cancel).await;
        };

        if let Err(e) = self.gate.wait_if_needed(cancel).await {
            frontier.restore(url);
            self.frontiers.enqueue(frontier);
            return Err(e);
        }

        let page = match self.fetcher.fetch_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                // The failed URL is dropped; the frontier itself must survive
                self.frontiers.enqueue(frontier);
                return Err(e);
            }
        };

        let mut new_records = 0;
        let mut hit_seen = false;
        {
            let mut dedup = self.dedup();
            for record in page.records {
                let content = match review_to_content(record) {
                    Ok(content) => content,
                    Err(e) => {
                        worker_warn!(WorkerId::Crawler, "Skipping record on {}: {}", url, e);
                        continue;
                    }
                };

                match dedup.observe(&synonym, content.authored_at.date_naive(), &content.author) {
                    Observation::New => {
                        self.buffer
                            .push(TaggedContent::new(content, SynonymSet::from([synonym.clone()])));
                        new_records += 1;
                    }
                    Observation::Seen => hit_seen = true,
                }
            }
        }

        let paginated = match page.next_page {
            Some(next) if !hit_seen => frontier.put(next),
            Some(_) => {
                worker_debug!(
                    WorkerId::Crawler,
                    "Already-seen review on {} for '{}', stopping pagination",
                    url,
                    synonym
                );
                false
            }
            None => false,
        };

        self.frontiers.enqueue(frontier);

        Ok(StepOutcome::Fetched {
            synonym,
            url,
            new_records,
            paginated,
        })
    }

    /// Refill an exhausted frontier from a term search and requeue it
    async fn reseed(&self, mut frontier: Frontier, cancel: &CancellationToken) -> CrawlerResult<StepOutcome> {
        let synonym = frontier.tag().clone();
        let urls = match self.search(&synonym, cancel).await {
            Ok(urls) => urls,
            Err(e) => {
                self.frontiers.enqueue(frontier);
                return Err(e);
            }
        };

        let count = urls.len();
        frontier.extend(urls);
        self.frontiers.enqueue(frontier);
        self.prune_dedup(Utc::now());

        worker_debug!(WorkerId::Crawler, "Seeded '{}' with {} review pages", synonym, count);
        Ok(StepOutcome::Reseeded { synonym, urls: count })
    }

    async fn search(&self, synonym: &Synonym, cancel: &CancellationToken) -> CrawlerResult<Vec<Url>> {
        self.gate.wait_if_needed(cancel).await?;
        let results = self.fetcher.fetch_search(synonym.as_str()).await?;
        Ok(filter_relevant(synonym, results)
            .into_iter()
            .map(|result| result.url)
            .collect())
    }

    /// Forget observations for review dates past the retention horizon
    fn prune_dedup(&self, now: DateTime<Utc>) {
        let Some(cutoff) = now.checked_sub_signed(self.dedup_retention) else {
            return;
        };
        let mut dedup = self.dedup();
        let pruned = dedup.prune_before(cutoff.date_naive());
        if pruned > 0 {
            worker_debug!(
                WorkerId::Crawler,
                "Pruned {} dedup days before {}, {} entries left",
                pruned,
                cutoff.date_naive(),
                dedup.len()
            );
        }
    }

    fn dedup(&self) -> MutexGuard<'_, DedupIndex> {
        self.dedup.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Turn an extracted review into a content record
///
/// The identifier hashes source, raw author, timestamp and the reviewer's
/// review count; the raw author name goes no further than this function.
pub fn review_to_content(record: ReviewRecord) -> CrawlerResult<Content> {
    let author = record.author.trim();
    if author.is_empty() {
        return Err(CrawlerError::malformed("review without author"));
    }
    let body = record.body.trim();
    if body.is_empty() {
        return Err(CrawlerError::malformed("review without body"));
    }

    let authored_at = record.authored_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let review_count = record.review_count.to_string();

    Ok(Content {
        id: ContentId::derive(SourceKind::Reviews, &[author, &authored_at, &review_count]),
        body: body.to_string(),
        authored_at: record.authored_at,
        author: AuthorId::pseudonymize(SourceKind::Reviews, author),
        origin: SourceMetadata::Reviews {
            review_count: record.review_count,
        },
        sentiment: None,
    })
}

#[async_trait]
impl<F> CrawlSource for Crawler<F>
where
    F: PageFetcher + 'static,
{
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    /// New synonyms get an empty frontier which the worker seeds on its first
    /// turn, so a large synonym change never stalls the caller behind the
    /// politeness gate.
    async fn use_synonyms(&self, synonyms: &SynonymSet) -> CrawlerResult<()> {
        if self.worker_exited() {
            return Err(CrawlerError::unavailable(SOURCE_NAME, "frontier worker exited"));
        }

        let previous = self.inner.frontiers.tracked();
        let fresh = self.inner.frontiers.use_synonyms(synonyms);
        {
            let mut dedup = self.inner.dedup();
            for removed in previous.difference(synonyms) {
                dedup.forget(removed);
            }
        }

        let added = fresh.len();
        for frontier in fresh {
            self.inner.frontiers.enqueue(frontier);
        }

        worker_info!(
            WorkerId::Crawler,
            "📋 Tracking {} synonyms ({} new)",
            synonyms.len(),
            added
        );
        Ok(())
    }

    fn drain(&self) -> Vec<TaggedContent> {
        self.inner.buffer.drain()
    }

    fn is_running(&self) -> bool {
        self.worker().as_ref().is_some_and(|handle| !handle.is_finished())
    }

    async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self.worker().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                worker_warn!(WorkerId::Crawler, "Frontier worker ended abnormally: {}", e);
            }
        }
    }
}
