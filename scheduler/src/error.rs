//! Scheduler-specific error types

use crawler::CrawlerError;
use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Configuration error: {field} - {message}")]
    ConfigurationError { field: String, message: String },

    #[error("Required endpoints missing: {}", .variables.join(", "))]
    RequiredEndpointMissing { variables: Vec<String> },

    #[error("{service} service failed: {reason}")]
    ServiceError { service: String, reason: String },

    #[error("Content store error during {operation}: {reason}")]
    StoreError { operation: String, reason: String },

    #[error("Crawl source error: {0}")]
    CrawlerError(#[from] CrawlerError),

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SchedulerError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn service(service: impl Into<String>, reason: impl ToString) -> Self {
        Self::ServiceError {
            service: service.into(),
            reason: reason.to_string(),
        }
    }

    pub fn store(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::StoreError {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
