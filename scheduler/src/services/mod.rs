//! Production implementations of the scheduler's collaborators

pub mod keywords;
pub mod memory_store;
pub mod sentiment;
pub mod snapshot_publisher;
pub mod sources;
pub mod synonym_registry;

#[cfg(test)]
mod tests;

pub use keywords::HttpKeywordService;
pub use memory_store::MemoryContentStore;
pub use sentiment::HttpSentimentService;
pub use snapshot_publisher::HttpSnapshotPublisher;
pub use sources::{FeedSourceFactory, ReviewSourceFactory};
pub use synonym_registry::HttpSynonymRegistry;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{SchedulerError, SchedulerResult};

pub(crate) fn http_client(timeout: Duration) -> SchedulerResult<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Decode a JSON body, treating any non-2xx status as a service failure
pub(crate) async fn read_json<T: DeserializeOwned>(service: &str, response: Response) -> SchedulerResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(SchedulerError::service(service, format!("status {}", status)));
    }
    response
        .json()
        .await
        .map_err(|e| SchedulerError::service(service, format!("bad response: {}", e)))
}
