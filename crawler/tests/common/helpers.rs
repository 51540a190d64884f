//! Scripted page fetcher that records every call

use async_trait::async_trait;
use crawler::{CrawlerError, CrawlerResult, PageFetcher, ReviewPage, SearchResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

#[derive(Default)]
struct Script {
    searches: HashMap<String, Vec<SearchResult>>,
    pages: HashMap<Url, ReviewPage>,
    search_log: Vec<String>,
    page_log: Vec<Url>,
}

/// Fake review site answering from fixed search results and pages
///
/// Cloning shares the script, so a test can keep a handle for assertions
/// after moving the fetcher into a crawler.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    script: Arc<Mutex<Script>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(self, term: &str, results: Vec<SearchResult>) -> Self {
        self.script.lock().unwrap().searches.insert(term.to_string(), results);
        self
    }

    pub fn with_page(self, url: Url, page: ReviewPage) -> Self {
        self.script.lock().unwrap().pages.insert(url, page);
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.script.lock().unwrap().search_log.clone()
    }

    pub fn fetched(&self) -> Vec<Url> {
        self.script.lock().unwrap().page_log.clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_search(&self, term: &str) -> CrawlerResult<Vec<SearchResult>> {
        let mut script = self.script.lock().unwrap();
        script.search_log.push(term.to_string());
        Ok(script.searches.get(term).cloned().unwrap_or_default())
    }

    async fn fetch_page(&self, url: &Url) -> CrawlerResult<ReviewPage> {
        let mut script = self.script.lock().unwrap();
        script.page_log.push(url.clone());
        script
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| CrawlerError::fetch(url.as_str(), "404"))
    }
}
