//! Polling feed client
//!
//! Turns `GET {base}/{items|comments}?after=<unix secs>` into an infinite
//! stream of entries. Each stream resumes from the newest entry it delivered,
//! so a stream reopened after a poll failure asks for everything it missed.

use chrono::Utc;
use futures_util::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::http_page_fetcher::parse_base;
use crate::error::{CrawlerError, CrawlerResult};
use crate::traits::FeedClient;
use crate::types::{FeedStream, RawFeedEntry};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Resume point of each sub-stream, in Unix seconds
///
/// Clones share the same positions, so they outlive any one opened stream
/// (and any one client, when handed to its replacement).
#[derive(Debug, Clone)]
pub struct FeedCursors {
    positions: Arc<[AtomicI64; 2]>,
}

impl FeedCursors {
    pub fn starting_at(after: i64) -> Self {
        Self {
            positions: Arc::new([AtomicI64::new(after), AtomicI64::new(after)]),
        }
    }

    fn slot(&self, stream: FeedStream) -> &AtomicI64 {
        match stream {
            FeedStream::Items => &self.positions[0],
            FeedStream::Comments => &self.positions[1],
        }
    }

    pub fn position(&self, stream: FeedStream) -> i64 {
        self.slot(stream).load(Ordering::SeqCst)
    }

    fn advance(&self, stream: FeedStream, created_utc: i64) {
        self.slot(stream).fetch_max(created_utc, Ordering::SeqCst);
    }
}

impl Default for FeedCursors {
    fn default() -> Self {
        Self::starting_at(Utc::now().timestamp())
    }
}

pub struct HttpFeedClient {
    client: Client,
    base_url: Url,
    poll_interval: Duration,
    cursors: FeedCursors,
}

struct PollState {
    client: Client,
    endpoint: Url,
    stream: FeedStream,
    cursors: FeedCursors,
    pending: VecDeque<RawFeedEntry>,
    poll_interval: Duration,
    polled: bool,
}

impl HttpFeedClient {
    /// Create a client whose streams start at the current time
    pub fn new(base_url: &str, poll_interval: Duration, timeout: Duration) -> CrawlerResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parse_base(base_url)?,
            poll_interval,
            cursors: FeedCursors::default(),
        })
    }

    /// Continue from the positions of an earlier client
    pub fn with_cursors(self, cursors: FeedCursors) -> Self {
        Self { cursors, ..self }
    }

    pub fn cursors(&self) -> &FeedCursors {
        &self.cursors
    }

    fn endpoint(&self, stream: FeedStream) -> CrawlerResult<Url> {
        self.base_url
            .join(stream.as_str())
            .map_err(|e| CrawlerError::InvalidUrl {
                input: format!("{}{}", self.base_url, stream),
                reason: e.to_string(),
            })
    }
}

impl PollState {
    async fn poll(&self) -> CrawlerResult<Vec<RawFeedEntry>> {
        let feed_error = |reason: String| CrawlerError::FeedError {
            stream: self.stream.to_string(),
            reason,
        };

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("after", self.cursors.position(self.stream))])
            .send()
            .await
            .map_err(|e| feed_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(feed_error(format!("status {}", status)));
        }

        response.json().await.map_err(|e| feed_error(e.to_string()))
    }
}

impl FeedClient for HttpFeedClient {
    fn stream(&self, stream: FeedStream) -> BoxStream<'static, CrawlerResult<RawFeedEntry>> {
        let endpoint = match self.endpoint(stream) {
            Ok(endpoint) => endpoint,
            Err(e) => return stream::once(async move { Err(e) }).boxed(),
        };

        let state = PollState {
            client: self.client.clone(),
            endpoint,
            stream,
            cursors: self.cursors.clone(),
            pending: VecDeque::new(),
            poll_interval: self.poll_interval,
            polled: false,
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if let Some(entry) = state.pending.pop_front() {
                    state.cursors.advance(state.stream, entry.created_utc);
                    return Some((Ok(entry), state));
                }

                if state.polled {
                    tokio::time::sleep(state.poll_interval).await;
                }
                state.polled = true;

                match state.poll().await {
                    Ok(entries) => state.pending.extend(entries),
                    Err(e) => return Some((Err(e), state)),
                }
            }
        })
        .boxed()
    }
}
