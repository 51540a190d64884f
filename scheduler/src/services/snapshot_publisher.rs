//! Snapshot publishing over HTTP
//!
//! Only the status code is consulted: any 2xx is success.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use shared::{worker_debug, WorkerId};

use super::http_client;
use crate::core::Snapshot;
use crate::error::{SchedulerError, SchedulerResult};
use crate::traits::SnapshotPublisher;

const SERVICE: &str = "snapshot";

pub struct HttpSnapshotPublisher {
    client: Client,
    url: String,
}

impl HttpSnapshotPublisher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> SchedulerResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SnapshotPublisher for HttpSnapshotPublisher {
    async fn publish(&self, snapshot: &Snapshot) -> SchedulerResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(snapshot)
            .send()
            .await
            .map_err(|e| SchedulerError::service(SERVICE, e))?;

        let status = response.status();
        worker_debug!(
            WorkerId::Scheduler,
            "Received status {} while publishing snapshot for '{}'",
            status,
            snapshot.synonym
        );
        if status.is_success() {
            Ok(())
        } else {
            Err(SchedulerError::service(SERVICE, format!("status {}", status)))
        }
    }
}
