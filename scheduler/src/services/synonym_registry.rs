//! Authoritative synonym list over HTTP
//!
//! `GET {url}` returns a JSON object keyed by term; only the keys are used.
//! Terms that fail normalisation are skipped.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;

use shared::{worker_debug, Synonym, SynonymSet, WorkerId};

use super::{http_client, read_json};
use crate::error::{SchedulerError, SchedulerResult};
use crate::traits::SynonymRegistry;

const SERVICE: &str = "synonym registry";

pub struct HttpSynonymRegistry {
    client: Client,
    url: String,
}

impl HttpSynonymRegistry {
    pub fn new(url: impl Into<String>, timeout: Duration) -> SchedulerResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SynonymRegistry for HttpSynonymRegistry {
    async fn fetch_synonyms(&self) -> SchedulerResult<SynonymSet> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SchedulerError::service(SERVICE, e))?;
        let terms: Map<String, Value> = read_json(SERVICE, response).await?;

        let synonyms = Synonym::parse_all(terms.keys().map(String::as_str));
        worker_debug!(
            WorkerId::Scheduler,
            "Registry listed {} terms, {} valid",
            terms.len(),
            synonyms.len()
        );
        Ok(synonyms)
    }
}
