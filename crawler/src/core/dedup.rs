//! In-memory record of (date, author) pairs already ingested per synonym
//!
//! This is only a fast path for stopping pagination; the content store's
//! identifier uniqueness stays the durable source of truth.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};

use shared::{AuthorId, Synonym};

/// Outcome of checking a record against the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First time this (synonym, date, author) was seen; now recorded
    New,
    /// Already recorded earlier
    Seen,
}

#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: HashMap<Synonym, BTreeMap<NaiveDate, HashSet<AuthorId>>>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a record and record it if unseen
    pub fn observe(&mut self, synonym: &Synonym, date: NaiveDate, author: &AuthorId) -> Observation {
        let authors = self
            .seen
            .entry(synonym.clone())
            .or_default()
            .entry(date)
            .or_default();

        if authors.insert(author.clone()) {
            Observation::New
        } else {
            Observation::Seen
        }
    }

    /// Drop everything recorded for a synonym that is no longer tracked
    pub fn forget(&mut self, synonym: &Synonym) {
        self.seen.remove(synonym);
    }

    /// Drop entries for dates strictly before `cutoff`; returns how many
    /// (synonym, date) buckets were removed
    pub fn prune_before(&mut self, cutoff: NaiveDate) -> usize {
        let mut removed = 0;
        for dates in self.seen.values_mut() {
            let kept = dates.split_off(&cutoff);
            removed += dates.len();
            *dates = kept;
        }
        self.seen.retain(|_, dates| !dates.is_empty());
        removed
    }

    /// Number of recorded (synonym, date, author) triples
    pub fn len(&self) -> usize {
        self.seen
            .values()
            .flat_map(|dates| dates.values())
            .map(HashSet::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
