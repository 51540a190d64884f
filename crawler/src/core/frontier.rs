//! Per-synonym queue of pending page URLs

use std::collections::{HashSet, VecDeque};
use url::Url;

use shared::Synonym;

/// Order-preserving, deduplicating queue of URLs owned by one synonym
///
/// A URL is ignored while it is already pending; once taken it may be queued
/// again later (a reseed starts from the same search results).
#[derive(Debug, Clone)]
pub struct Frontier {
    tag: Synonym,
    generation: u64,
    pending: VecDeque<Url>,
    members: HashSet<Url>,
}

impl Frontier {
    /// Create an empty frontier
    ///
    /// `generation` identifies this frontier among all frontiers ever created
    /// for the same synonym; see [`FrontierScheduler`](super::FrontierScheduler).
    pub fn new(tag: Synonym, generation: u64) -> Self {
        Self {
            tag,
            generation,
            pending: VecDeque::new(),
            members: HashSet::new(),
        }
    }

    pub fn tag(&self) -> &Synonym {
        &self.tag
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Append `url` unless it is already pending; returns whether it was added
    pub fn put(&mut self, url: Url) -> bool {
        if !self.members.insert(url.clone()) {
            return false;
        }
        self.pending.push_back(url);
        true
    }

    /// Put a taken URL back at the head, ahead of everything still pending
    pub fn restore(&mut self, url: Url) -> bool {
        if !self.members.insert(url.clone()) {
            return false;
        }
        self.pending.push_front(url);
        true
    }

    /// Remove and return the oldest pending URL
    pub fn take(&mut self) -> Option<Url> {
        let url = self.pending.pop_front()?;
        self.members.remove(&url);
        Some(url)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl Extend<Url> for Frontier {
    fn extend<I: IntoIterator<Item = Url>>(&mut self, iter: I) {
        for url in iter {
            self.put(url);
        }
    }
}
