//! Keyword extraction over HTTP: `POST [bodies]` returns `[keywords]`

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{http_client, read_json};
use crate::error::{SchedulerError, SchedulerResult};
use crate::traits::KeywordService;

const SERVICE: &str = "keywords";

pub struct HttpKeywordService {
    client: Client,
    url: String,
}

impl HttpKeywordService {
    pub fn new(url: impl Into<String>, timeout: Duration) -> SchedulerResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl KeywordService for HttpKeywordService {
    async fn extract(&self, bodies: Vec<String>) -> SchedulerResult<Vec<String>> {
        let response = self
            .client
            .post(&self.url)
            .json(&bodies)
            .send()
            .await
            .map_err(|e| SchedulerError::service(SERVICE, e))?;
        read_json(SERVICE, response).await
    }
}
