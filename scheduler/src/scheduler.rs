//! Orchestration loop
//!
//! One cycle refreshes the synonym set, propagates changes to the sources,
//! drains and commits their output, backfills sentiment scores and, when the
//! watermark is due, runs one snapshot pass. Remote and store failures are
//! logged and retried on a later cycle; the cycle itself runs under the
//! restart-with-backoff supervisor.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use shared::{
    logging, supervise, worker_debug, worker_error, worker_info, worker_warn, RestartPolicy, SynonymSet,
    TaggedContent, WorkerId,
};

use crate::core::{build_snapshot, Watermark};
use crate::error::SchedulerResult;
use crate::supervisor::SupervisedSource;
use crate::traits::{ContentStore, KeywordService, SentimentService, SnapshotPublisher, SynonymRegistry};
use crate::types::CycleReport;

/// Loop timing and the always-tracked manual synonyms
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub snapshot_window: Duration,
    pub cycle_sleep: Duration,
    pub manual_synonyms: SynonymSet,
    pub restart_policy: RestartPolicy,
}

struct SchedulerState {
    tracked: SynonymSet,
    watermark: Watermark,
    sources: Vec<SupervisedSource>,
    /// Drained records the store has not accepted yet
    ///
    /// A record leaves this list only once its commit returns, so a cycle
    /// interrupted mid-commit leaves the rest here for the final flush.
    uncommitted: Vec<TaggedContent>,
}

pub struct Scheduler<R, S, K, P, C>
where
    R: SynonymRegistry,
    S: SentimentService,
    K: KeywordService,
    P: SnapshotPublisher,
    C: ContentStore,
{
    run_id: Uuid,
    registry: R,
    sentiment: S,
    keywords: K,
    publisher: P,
    store: C,
    settings: SchedulerSettings,
    state: Mutex<SchedulerState>,
}

impl<R, S, K, P, C> Scheduler<R, S, K, P, C>
where
    R: SynonymRegistry,
    S: SentimentService,
    K: KeywordService,
    P: SnapshotPublisher,
    C: ContentStore,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: R,
        sentiment: S,
        keywords: K,
        publisher: P,
        store: C,
        sources: Vec<SupervisedSource>,
        settings: SchedulerSettings,
    ) -> SchedulerResult<Self> {
        let watermark = Watermark::starting_at(Utc::now(), settings.snapshot_window)?;
        Ok(Self {
            run_id: Uuid::new_v4(),
            registry,
            sentiment,
            keywords,
            publisher,
            store,
            settings,
            state: Mutex::new(SchedulerState {
                tracked: SynonymSet::new(),
                watermark,
                sources,
                uncommitted: Vec::new(),
            }),
        })
    }

    /// Replace the initial watermark
    pub fn with_watermark(self, watermark: Watermark) -> Self {
        let mut state = self.state.into_inner();
        state.watermark = watermark;
        Self {
            state: Mutex::new(state),
            ..self
        }
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    pub async fn tracked(&self) -> SynonymSet {
        self.state.lock().await.tracked.clone()
    }

    pub async fn watermark(&self) -> Watermark {
        self.state.lock().await.watermark.clone()
    }

    /// Run cycles until `cancel` fires, then flush both sources
    pub async fn run(&self, cancel: &CancellationToken) -> SchedulerResult<()> {
        logging::log_startup(WorkerId::Scheduler, &format!("orchestration loop (run {})", self.run_id));

        let exit = supervise(WorkerId::Scheduler, &self.settings.restart_policy, cancel, || {
            self.cycle_loop(cancel)
        })
        .await;
        worker_debug!(WorkerId::Scheduler, "Cycle loop ended: {:?}", exit);

        let flushed = self.flush().await;
        logging::log_shutdown(WorkerId::Scheduler, &format!("flushed {} records", flushed));
        Ok(())
    }

    async fn cycle_loop(&self, cancel: &CancellationToken) -> SchedulerResult<()> {
        loop {
            let report = self.run_cycle().await?;
            if report.window_pass.is_some() {
                continue;
            }
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.settings.cycle_sleep) => {}
            }
        }
    }

    pub async fn run_cycle(&self) -> SchedulerResult<CycleReport> {
        self.run_cycle_at(Utc::now()).await
    }

    /// One full cycle with `now` as the wall clock
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> SchedulerResult<CycleReport> {
        let mut state = self.state.lock().await;
        let mut report = CycleReport::default();

        for source in state.sources.iter_mut() {
            if let Err(e) = source.ensure_running().await {
                worker_warn!(WorkerId::Scheduler, "Source {} unavailable: {}", source.name(), e);
            }
        }

        let synonyms = self.refresh_synonyms(&state.tracked).await;
        if synonyms != state.tracked {
            self.propagate(&mut state, &synonyms).await;
            report.synonyms_changed = true;
        }

        let drained: Vec<TaggedContent> = state.sources.iter_mut().flat_map(|source| source.drain()).collect();
        report.drained = drained.len();
        state.uncommitted.extend(drained);
        report.committed = self.commit_pending(&mut state).await;

        report.scored = self.backfill_sentiment().await;

        if state.watermark.is_due(now) {
            report.window_pass = Some(self.snapshot_pass(&mut state).await);
        }

        if report != CycleReport::default() {
            worker_debug!(WorkerId::Scheduler, "Cycle: {:?}", report);
        }
        Ok(report)
    }

    /// Registry set unioned with the manual synonyms; the last known set if
    /// the registry is unreachable
    async fn refresh_synonyms(&self, last_known: &SynonymSet) -> SynonymSet {
        match self.registry.fetch_synonyms().await {
            Ok(mut synonyms) => {
                synonyms.extend(self.settings.manual_synonyms.iter().cloned());
                synonyms
            }
            Err(e) => {
                worker_warn!(WorkerId::Scheduler, "Synonym registry unavailable, keeping last set: {}", e);
                let mut synonyms = last_known.clone();
                synonyms.extend(self.settings.manual_synonyms.iter().cloned());
                synonyms
            }
        }
    }

    async fn propagate(&self, state: &mut SchedulerState, synonyms: &SynonymSet) {
        let added = synonyms.difference(&state.tracked).count();
        let removed = state.tracked.difference(synonyms).count();
        worker_info!(
            WorkerId::Scheduler,
            "📋 Synonym set changed: {} tracked (+{} -{})",
            synonyms.len(),
            added,
            removed
        );

        let mut union = state.tracked.clone();
        union.extend(synonyms.iter().cloned());
        if let Err(e) = self.store.commit_synonyms(&union).await {
            logging::log_error(WorkerId::Scheduler, "committing synonyms", &e);
        }

        for source in state.sources.iter_mut() {
            if let Err(e) = source.use_synonyms(synonyms).await {
                logging::log_error(WorkerId::Scheduler, &format!("updating source {}", source.name()), &e);
            }
        }

        state.tracked = synonyms.clone();
    }

    /// Commit every pending record, keeping the ones the store rejects;
    /// returns how many were new
    async fn commit_pending(&self, state: &mut SchedulerState) -> usize {
        let mut committed = 0;
        let mut index = 0;
        while index < state.uncommitted.len() {
            let record = state.uncommitted[index].clone();
            match self.store.commit(record).await {
                Ok(new) => {
                    if new {
                        committed += 1;
                    }
                    state.uncommitted.remove(index);
                }
                Err(e) => {
                    let id = state.uncommitted[index].id();
                    logging::log_error(WorkerId::Scheduler, &format!("committing {}", id), &e);
                    index += 1;
                }
            }
        }
        committed
    }

    /// Score every unscored record in one batch; returns how many were scored
    async fn backfill_sentiment(&self) -> usize {
        let unscored = match self.store.query_unscored().await {
            Ok(unscored) if unscored.is_empty() => return 0,
            Ok(unscored) => unscored,
            Err(e) => {
                logging::log_error(WorkerId::Scheduler, "querying unscored content", &e);
                return 0;
            }
        };

        let bodies = unscored.iter().map(|record| record.body.clone()).collect();
        let scores = match self.sentiment.score(bodies).await {
            Ok(scores) if scores.len() == unscored.len() => scores,
            Ok(scores) => {
                worker_warn!(
                    WorkerId::Scheduler,
                    "Sentiment service returned {} scores for {} bodies",
                    scores.len(),
                    unscored.len()
                );
                return 0;
            }
            Err(e) => {
                worker_warn!(WorkerId::Scheduler, "Sentiment scoring deferred: {}", e);
                return 0;
            }
        };

        let mut scored = 0;
        for (record, score) in unscored.iter().zip(scores) {
            if !(0.0..=1.0).contains(&score) {
                worker_warn!(WorkerId::Scheduler, "Discarding score {} for {}", score, record.id);
                continue;
            }
            match self.store.set_sentiment(&record.id, score).await {
                Ok(()) => scored += 1,
                Err(e) => logging::log_error(WorkerId::Scheduler, "storing sentiment", &e),
            }
        }
        scored
    }

    /// Aggregate the watermark's window for every tracked synonym, then
    /// advance the watermark; returns how many snapshots were published
    async fn snapshot_pass(&self, state: &mut SchedulerState) -> usize {
        let (from, to) = state.watermark.current_window();
        let mut published = 0;

        for synonym in &state.tracked {
            let records = match self.store.query_window(synonym, from, to).await {
                Ok(records) => records,
                Err(e) => {
                    logging::log_error(WorkerId::Scheduler, &format!("querying window for '{}'", synonym), &e);
                    continue;
                }
            };

            match build_snapshot(synonym, from, to, &records, &self.keywords).await {
                Ok(Some(snapshot)) => {
                    if snapshot.publish(&self.publisher).await {
                        published += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    worker_warn!(WorkerId::Scheduler, "Skipping snapshot for '{}': {}", synonym, e);
                }
            }
        }

        state.watermark.advance();
        worker_info!(
            WorkerId::Scheduler,
            "📸 Window [{}, {}) done: {} snapshots published",
            from,
            to,
            published
        );
        published
    }

    /// Stop every source and commit what they still held, along with
    /// anything an interrupted cycle left pending
    async fn flush(&self) -> usize {
        let mut state = self.state.lock().await;
        let mut remaining = Vec::new();
        for source in state.sources.iter_mut() {
            remaining.extend(source.shutdown().await);
        }
        state.uncommitted.extend(remaining);

        let total = state.uncommitted.len();
        self.commit_pending(&mut state).await;
        if !state.uncommitted.is_empty() {
            worker_error!(
                WorkerId::Scheduler,
                "{} records could not be committed before exit",
                state.uncommitted.len()
            );
        }
        total
    }
}
