//! Batch sentiment scoring over HTTP: `POST [bodies]` returns `[scores]`

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{http_client, read_json};
use crate::error::{SchedulerError, SchedulerResult};
use crate::traits::SentimentService;

const SERVICE: &str = "sentiment";

pub struct HttpSentimentService {
    client: Client,
    url: String,
}

impl HttpSentimentService {
    pub fn new(url: impl Into<String>, timeout: Duration) -> SchedulerResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SentimentService for HttpSentimentService {
    async fn score(&self, bodies: Vec<String>) -> SchedulerResult<Vec<f64>> {
        let response = self
            .client
            .post(&self.url)
            .json(&bodies)
            .send()
            .await
            .map_err(|e| SchedulerError::service(SERVICE, e))?;
        let scores: Vec<f64> = read_json(SERVICE, response).await?;

        if scores.len() != bodies.len() {
            return Err(SchedulerError::service(
                SERVICE,
                format!("{} scores for {} bodies", scores.len(), bodies.len()),
            ));
        }
        Ok(scores)
    }
}
