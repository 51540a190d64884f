//! Secondary source: keyword matching over the discussion feed
//!
//! Two independent workers consume the items and comments sub-streams. Every
//! entry is tokenized and tested against the tracked synonyms; entries that
//! match nothing are dropped, the rest are buffered tagged with every synonym
//! they matched.

use async_trait::async_trait;
use chrono::SecondsFormat;
use futures_util::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use shared::{
    supervise, worker_info, worker_warn, AuthorId, Content, ContentId, RestartPolicy,
    SourceKind, SourceMetadata, SynonymSet, TaggedContent,
};

use crate::core::{OutputBuffer, SynonymMatcher};
use crate::error::{CrawlerError, CrawlerResult};
use crate::traits::{CrawlSource, FeedClient};
use crate::types::{FeedBody, FeedEntry, FeedStream, RawFeedEntry};

const SOURCE_NAME: &str = "feed";

struct FeedInner<C> {
    client: C,
    matcher: RwLock<SynonymMatcher>,
    buffer: OutputBuffer<TaggedContent>,
    restart_policy: RestartPolicy,
}

/// Feed source with one supervised worker per sub-stream
pub struct FeedScraper<C>
where
    C: FeedClient + 'static,
{
    inner: Arc<FeedInner<C>>,
    cancel: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<C> FeedScraper<C>
where
    C: FeedClient + 'static,
{
    pub fn new(client: C, restart_policy: RestartPolicy, cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::new(FeedInner {
                client,
                matcher: RwLock::new(SynonymMatcher::default()),
                buffer: OutputBuffer::new(),
                restart_policy,
            }),
            cancel,
            workers: Mutex::new(Vec::new()),
        }
    }

    fn workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn both stream workers; a second call is a no-op
    pub fn start(&self) {
        let mut workers = self.workers();
        if !workers.is_empty() {
            return;
        }

        for stream in FeedStream::ALL {
            let inner = self.inner.clone();
            let cancel = self.cancel.clone();
            workers.push(tokio::spawn(async move {
                let worker = stream.worker_id();
                worker_info!(worker, "📡 Feed worker started for {}", stream);
                let exit = supervise(worker, &inner.restart_policy, &cancel, || {
                    let inner = inner.clone();
                    let cancel = cancel.clone();
                    async move { inner.consume(stream, &cancel).await }
                })
                .await;
                worker_info!(worker, "Feed worker for {} stopped ({:?})", stream, exit);
            }));
        }
    }

    /// Match one raw entry against the current synonyms and buffer it if it hits
    pub fn ingest(&self, raw: RawFeedEntry) -> CrawlerResult<bool> {
        self.inner.ingest(raw)
    }

    pub fn buffered(&self) -> usize {
        self.inner.buffer.len()
    }
}

impl<C> FeedInner<C>
where
    C: FeedClient + 'static,
{
    async fn consume(&self, stream: FeedStream, cancel: &CancellationToken) -> CrawlerResult<()> {
        let worker = stream.worker_id();
        let mut entries = self.client.stream(stream);

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                next = entries.next() => next,
            };

            match next {
                None => {
                    return Err(CrawlerError::StreamEnded {
                        stream: stream.to_string(),
                    })
                }
                Some(Ok(raw)) => match self.ingest(raw) {
                    Ok(_) => {}
                    Err(e) => worker_warn!(worker, "Skipping entry: {}", e),
                },
                Some(Err(e @ CrawlerError::MalformedRecord { .. })) => {
                    worker_warn!(worker, "Skipping entry: {}", e)
                }
                Some(Err(e)) => return Err(e),
            }
        }
    }

    fn ingest(&self, raw: RawFeedEntry) -> CrawlerResult<bool> {
        let entry = FeedEntry::try_from(raw)?;
        if let FeedBody::Submission { text } = &entry.body {
            if text.trim().is_empty() {
                return Ok(false);
            }
        }

        let matched = self
            .matcher
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .matches(entry.body.text());
        if matched.is_empty() {
            return Ok(false);
        }

        debug!(
            "Feed {} in {} matched {} synonyms",
            entry.body.kind(),
            entry.channel,
            matched.len()
        );
        self.buffer.push(TaggedContent::new(feed_to_content(entry)?, matched));
        Ok(true)
    }
}

/// Turn a validated feed entry into a content record
pub fn feed_to_content(entry: FeedEntry) -> CrawlerResult<Content> {
    let author = entry.author.trim();
    if author.is_empty() {
        return Err(CrawlerError::malformed("feed entry without author"));
    }

    let created_at = entry.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let id = ContentId::derive(
        SourceKind::Feed,
        &[entry.body.kind().as_str(), &entry.channel, author, &created_at, entry.body.text()],
    );
    let author = AuthorId::pseudonymize(SourceKind::Feed, author);

    Ok(Content {
        id,
        body: entry.body.text().to_string(),
        authored_at: entry.created_at,
        author,
        origin: SourceMetadata::Feed {
            kind: entry.body.kind(),
            channel: entry.channel,
        },
        sentiment: None,
    })
}

#[async_trait]
impl<C> CrawlSource for FeedScraper<C>
where
    C: FeedClient + 'static,
{
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn use_synonyms(&self, synonyms: &SynonymSet) -> CrawlerResult<()> {
        let exited = {
            let workers = self.workers();
            !workers.is_empty() && workers.iter().any(JoinHandle::is_finished)
        };
        if exited {
            return Err(CrawlerError::unavailable(SOURCE_NAME, "feed worker exited"));
        }

        *self
            .inner
            .matcher
            .write()
            .unwrap_or_else(PoisonError::into_inner) = SynonymMatcher::new(synonyms);
        Ok(())
    }

    fn drain(&self) -> Vec<TaggedContent> {
        self.inner.buffer.drain()
    }

    fn is_running(&self) -> bool {
        let workers = self.workers();
        !workers.is_empty() && workers.iter().all(|handle| !handle.is_finished())
    }

    async fn shutdown(&self) {
        self.cancel.cancel();
        let handles: Vec<_> = self.workers().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Feed worker ended abnormally: {}", e);
            }
        }
    }
}
