//! Review-site fetcher backed by an extraction service
//!
//! Markup parsing lives behind the extraction service; this client only
//! speaks its JSON contract:
//!
//! - `GET {base}/search?term=<term>` returns `[{"label": .., "url": ..}]`
//! - `GET {base}/page?url=<page url>` returns `{"records": [..], "next_page": ..}`

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{CrawlerError, CrawlerResult};
use crate::traits::PageFetcher;
use crate::types::{ReviewPage, SearchResult};

pub struct HttpPageFetcher {
    client: Client,
    base_url: Url,
}

impl HttpPageFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> CrawlerResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parse_base(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> CrawlerResult<Url> {
        self.base_url.join(path).map_err(|e| CrawlerError::InvalidUrl {
            input: format!("{}{}", self.base_url, path),
            reason: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Url, query: &[(&str, &str)]) -> CrawlerResult<T> {
        let response = self
            .client
            .get(endpoint.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| CrawlerError::fetch(endpoint.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlerError::fetch(endpoint.as_str(), format!("status {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| CrawlerError::malformed(format!("bad response from {}: {}", endpoint, e)))
    }
}

/// Parse a base URL so that `join` appends rather than replaces the last segment
pub(crate) fn parse_base(input: &str) -> CrawlerResult<Url> {
    let with_slash = if input.ends_with('/') {
        input.to_string()
    } else {
        format!("{}/", input)
    };
    Url::parse(&with_slash).map_err(|e| CrawlerError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_search(&self, term: &str) -> CrawlerResult<Vec<SearchResult>> {
        let results: Vec<SearchResult> = self.get_json(self.endpoint("search")?, &[("term", term)]).await?;
        debug!("Search for '{}' returned {} results", term, results.len());
        Ok(results)
    }

    async fn fetch_page(&self, url: &Url) -> CrawlerResult<ReviewPage> {
        self.get_json(self.endpoint("page")?, &[("url", url.as_str())]).await
    }
}
