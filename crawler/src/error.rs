//! Crawler error types

use shared::SharedError;
use thiserror::Error;

/// Result type for crawler operations
pub type CrawlerResult<T> = Result<T, CrawlerError>;

/// Crawler error types
#[derive(Error, Debug)]
pub enum CrawlerError {
    #[error("Fetch failed for {url}: {reason}")]
    FetchError { url: String, reason: String },

    #[error("Malformed record: {message}")]
    MalformedRecord { message: String },

    #[error("Feed stream {stream} failed: {reason}")]
    FeedError { stream: String, reason: String },

    #[error("Feed stream {stream} ended")]
    StreamEnded { stream: String },

    #[error("Source unavailable: {source_name} - {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Invalid URL {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Worker cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),
}

impl CrawlerError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::FetchError {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }

    pub fn unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Structural errors mean the source's internal state can't be trusted
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}
