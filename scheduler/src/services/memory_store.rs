//! In-memory content store
//!
//! Records are keyed by content identifier, which makes `commit` idempotent.
//! A duplicate commit still merges its synonym tags into the stored record so
//! that a post found for a second synonym is aggregated for both.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use shared::{worker_debug, ContentId, Synonym, SynonymSet, TaggedContent, WorkerId};

use crate::error::{SchedulerError, SchedulerResult};
use crate::traits::ContentStore;
use crate::types::{StoredContent, UnscoredContent, WindowRecord};

#[derive(Default)]
struct StoreState {
    records: BTreeMap<ContentId, StoredContent>,
    synonyms: SynonymSet,
}

#[derive(Default)]
pub struct MemoryContentStore {
    state: Mutex<StoreState>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every synonym ever committed
    pub fn synonyms(&self) -> SynonymSet {
        self.state().synonyms.clone()
    }

    pub fn len(&self) -> usize {
        self.state().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn commit(&self, tagged: TaggedContent) -> SchedulerResult<bool> {
        let mut state = self.state();
        if let Some(existing) = state.records.get_mut(tagged.id()) {
            existing.synonyms.extend(tagged.synonyms);
            return Ok(false);
        }

        worker_debug!(
            WorkerId::Scheduler,
            "Storing {} content {}",
            tagged.content.source(),
            tagged.content.id
        );
        state.records.insert(
            tagged.content.id.clone(),
            StoredContent {
                content: tagged.content,
                synonyms: tagged.synonyms,
            },
        );
        Ok(true)
    }

    async fn query_unscored(&self) -> SchedulerResult<Vec<UnscoredContent>> {
        Ok(self
            .state()
            .records
            .values()
            .filter(|stored| stored.content.sentiment.is_none())
            .map(|stored| UnscoredContent {
                id: stored.content.id.clone(),
                body: stored.content.body.clone(),
            })
            .collect())
    }

    async fn set_sentiment(&self, id: &ContentId, score: f64) -> SchedulerResult<()> {
        let mut state = self.state();
        let stored = state
            .records
            .get_mut(id)
            .ok_or_else(|| SchedulerError::store("set_sentiment", format!("unknown content {}", id)))?;

        match stored.content.sentiment {
            Some(_) => worker_debug!(WorkerId::Scheduler, "Content {} already scored", id),
            None => stored.content.sentiment = Some(score),
        }
        Ok(())
    }

    async fn query_window(
        &self,
        synonym: &Synonym,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> SchedulerResult<Vec<WindowRecord>> {
        Ok(self
            .state()
            .records
            .values()
            .filter(|stored| stored.synonyms.contains(synonym))
            .filter(|stored| stored.content.authored_at >= from && stored.content.authored_at < to)
            .map(|stored| WindowRecord {
                id: stored.content.id.clone(),
                body: stored.content.body.clone(),
                authored_at: stored.content.authored_at,
                sentiment: stored.content.sentiment,
            })
            .collect())
    }

    async fn commit_synonyms(&self, synonyms: &SynonymSet) -> SchedulerResult<()> {
        self.state().synonyms.extend(synonyms.iter().cloned());
        Ok(())
    }

    async fn clear_all(&self) -> SchedulerResult<usize> {
        let mut state = self.state();
        let removed = state.records.len();
        state.records.clear();
        Ok(removed)
    }

    async fn all_content(&self) -> SchedulerResult<Vec<StoredContent>> {
        Ok(self.state().records.values().cloned().collect())
    }
}
