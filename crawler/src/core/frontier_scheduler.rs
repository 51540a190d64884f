//! Blocking round-robin container of frontiers
//!
//! Every tracked synonym owns exactly one live frontier, which is either
//! queued here or checked out by the crawl worker. Dequeue always takes the
//! head and the worker always re-enqueues at the tail, so each synonym gets one
//! step per rotation.
//!
//! Untracking is lazy: a frontier whose synonym is gone (or that belongs to an
//! older generation of a re-added synonym) is dropped when it reaches the head,
//! so changing the synonym set never scans or locks the whole queue for long.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use shared::{worker_debug, Synonym, SynonymSet, WorkerId};

use super::frontier::Frontier;
use crate::error::{CrawlerError, CrawlerResult};

#[derive(Default)]
struct QueueState {
    queue: VecDeque<Frontier>,
    /// Live generation per tracked synonym
    tracked: HashMap<Synonym, u64>,
    next_generation: u64,
}

impl QueueState {
    fn is_live(&self, frontier: &Frontier) -> bool {
        self.tracked.get(frontier.tag()) == Some(&frontier.generation())
    }
}

#[derive(Default)]
pub struct FrontierScheduler {
    state: Mutex<QueueState>,
    available: Notify,
}

impl FrontierScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the tracked set
    ///
    /// Returns one fresh, empty frontier for every newly tracked synonym. The
    /// caller seeds and enqueues them; until then they count as checked out.
    pub fn use_synonyms(&self, synonyms: &SynonymSet) -> Vec<Frontier> {
        let mut state = self.state();
        state.tracked.retain(|synonym, _| synonyms.contains(synonym));

        let mut fresh = Vec::new();
        for synonym in synonyms {
            if state.tracked.contains_key(synonym) {
                continue;
            }
            state.next_generation += 1;
            let generation = state.next_generation;
            state.tracked.insert(synonym.clone(), generation);
            fresh.push(Frontier::new(synonym.clone(), generation));
        }
        fresh
    }

    /// Append a frontier to the tail
    pub fn enqueue(&self, frontier: Frontier) {
        self.state().queue.push_back(frontier);
        self.available.notify_one();
    }

    /// Remove the head frontier, waiting while the container is empty
    pub async fn dequeue(&self, cancel: &CancellationToken) -> CrawlerResult<Frontier> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(frontier) = self.try_dequeue() {
                return Ok(frontier);
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(CrawlerError::Cancelled),
                _ = &mut notified => {}
            }
        }
    }

    /// Remove the head live frontier without waiting
    pub fn try_dequeue(&self) -> Option<Frontier> {
        let mut state = self.state();
        while let Some(frontier) = state.queue.pop_front() {
            if state.is_live(&frontier) {
                return Some(frontier);
            }
            worker_debug!(
                WorkerId::Crawler,
                "Dropping frontier for untracked synonym '{}' (generation {})",
                frontier.tag(),
                frontier.generation()
            );
        }
        None
    }

    /// Whether `frontier` is still the live frontier of a tracked synonym
    pub fn is_live(&self, frontier: &Frontier) -> bool {
        self.state().is_live(frontier)
    }

    pub fn tracked(&self) -> SynonymSet {
        self.state().tracked.keys().cloned().collect()
    }

    /// Queued frontiers, including stale ones not yet filtered out
    pub fn len(&self) -> usize {
        self.state().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn synonyms(names: &[&str]) -> SynonymSet {
        Synonym::parse_all(names.iter().copied())
    }

    fn tag_names(frontiers: &[Frontier]) -> Vec<String> {
        frontiers.iter().map(|f| f.tag().to_string()).collect()
    }

    #[tokio::test]
    async fn test_round_robin_fairness() {
        let scheduler = FrontierScheduler::new();
        let cancel = CancellationToken::new();
        for frontier in scheduler.use_synonyms(&synonyms(&["alpha", "bravo", "charlie", "delta"])) {
            scheduler.enqueue(frontier);
        }

        // Two full rotations, re-enqueueing like the crawl worker does
        let mut order = Vec::new();
        for _ in 0..8 {
            let frontier = scheduler.dequeue(&cancel).await.unwrap();
            order.push(frontier.tag().to_string());
            scheduler.enqueue(frontier);
        }

        let rotation = vec!["alpha", "bravo", "charlie", "delta"];
        assert_eq!(order[..4], rotation[..]);
        assert_eq!(order[4..], rotation[..]);
    }

    #[test]
    fn test_use_synonyms_returns_only_new_frontiers() {
        let scheduler = FrontierScheduler::new();
        let first = scheduler.use_synonyms(&synonyms(&["alpha", "bravo"]));
        assert_eq!(tag_names(&first), vec!["alpha", "bravo"]);

        let second = scheduler.use_synonyms(&synonyms(&["alpha", "bravo", "charlie"]));
        assert_eq!(tag_names(&second), vec!["charlie"]);

        assert_eq!(scheduler.tracked(), synonyms(&["alpha", "bravo", "charlie"]));
    }

    #[test]
    fn test_untracked_frontier_removed_lazily() {
        let scheduler = FrontierScheduler::new();
        for frontier in scheduler.use_synonyms(&synonyms(&["alpha", "bravo"])) {
            scheduler.enqueue(frontier);
        }

        scheduler.use_synonyms(&synonyms(&["bravo"]));
        // Still queued until it reaches the head
        assert_eq!(scheduler.len(), 2);

        let next = scheduler.try_dequeue().unwrap();
        assert_eq!(next.tag().as_str(), "bravo");
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_readded_synonym_keeps_single_frontier() {
        let scheduler = FrontierScheduler::new();
        for frontier in scheduler.use_synonyms(&synonyms(&["alpha"])) {
            scheduler.enqueue(frontier);
        }

        // Removed and re-added before the stale frontier is dequeued
        scheduler.use_synonyms(&SynonymSet::new());
        let fresh = scheduler.use_synonyms(&synonyms(&["alpha"]));
        assert_eq!(fresh.len(), 1);
        for frontier in fresh {
            scheduler.enqueue(frontier);
        }

        let live = scheduler.try_dequeue().unwrap();
        assert_eq!(live.generation(), 2);
        assert!(scheduler.try_dequeue().is_none());
    }

    #[test]
    fn test_checked_out_frontier_goes_stale() {
        let scheduler = FrontierScheduler::new();
        let mut fresh = scheduler.use_synonyms(&synonyms(&["alpha"]));
        let checked_out = fresh.remove(0);
        assert!(scheduler.is_live(&checked_out));

        scheduler.use_synonyms(&SynonymSet::new());
        assert!(!scheduler.is_live(&checked_out));

        scheduler.enqueue(checked_out);
        assert!(scheduler.try_dequeue().is_none());
    }

    #[tokio::test]
    async fn test_dequeue_blocks_until_enqueue() {
        let scheduler = Arc::new(FrontierScheduler::new());
        let cancel = CancellationToken::new();
        let fresh = scheduler.use_synonyms(&synonyms(&["alpha"]));

        let waiter = {
            let scheduler = scheduler.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { scheduler.dequeue(&cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        for frontier in fresh {
            scheduler.enqueue(frontier);
        }
        let frontier = waiter.await.unwrap().unwrap();
        assert_eq!(frontier.tag().as_str(), "alpha");
    }

    #[tokio::test]
    async fn test_dequeue_observes_cancellation() {
        let scheduler = FrontierScheduler::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = scheduler.dequeue(&cancel).await;
        assert!(matches!(result, Err(CrawlerError::Cancelled)));
    }
}
