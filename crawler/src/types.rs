//! Crawler-specific data types

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use shared::{FeedEntryKind, WorkerId};

use crate::error::{CrawlerError, CrawlerResult};

/// One hit from a review-site term search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Visible result heading, e.g. `"Acme | www.acme.com"`
    pub label: String,
    pub url: Url,
}

/// A single review as extracted by the page fetcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub title: Option<String>,
    pub body: String,
    pub authored_at: DateTime<Utc>,
    /// Raw reviewer name; hashed before it leaves the crawler
    pub author: String,
    /// Reviewer's total review count, used to tell apart same-day reviews
    #[serde(default)]
    pub review_count: u32,
}

/// Extracted contents of one review page
///
/// Precondition of the page-fetch contract: `records` are ordered newest
/// first, and every following page holds strictly older reviews. The crawler
/// stops paginating at the first already-seen review on that basis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewPage {
    pub records: Vec<ReviewRecord>,
    #[serde(default)]
    pub next_page: Option<Url>,
}

/// The two independent feed sub-streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStream {
    Items,
    Comments,
}

impl FeedStream {
    pub const ALL: [FeedStream; 2] = [FeedStream::Items, FeedStream::Comments];

    pub fn worker_id(&self) -> WorkerId {
        match self {
            FeedStream::Items => WorkerId::FeedItems,
            FeedStream::Comments => WorkerId::FeedComments,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedStream::Items => "items",
            FeedStream::Comments => "comments",
        }
    }
}

impl fmt::Display for FeedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry kind as reported by the feed collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawEntryKind {
    Submission,
    Comment,
}

/// Feed entry as delivered by the feed client, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFeedEntry {
    pub kind: RawEntryKind,
    /// Creation time, seconds since the Unix epoch (UTC)
    pub created_utc: i64,
    pub channel: String,
    pub author: String,
    /// Submission body markup
    #[serde(default)]
    pub selftext: Option<String>,
    /// Comment body markup
    #[serde(default)]
    pub body: Option<String>,
}

/// Entry text, resolved once at ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedBody {
    Submission { text: String },
    Comment { text: String },
}

impl FeedBody {
    pub fn text(&self) -> &str {
        match self {
            FeedBody::Submission { text } | FeedBody::Comment { text } => text,
        }
    }

    pub fn kind(&self) -> FeedEntryKind {
        match self {
            FeedBody::Submission { .. } => FeedEntryKind::Submission,
            FeedBody::Comment { .. } => FeedEntryKind::Comment,
        }
    }
}

/// Validated feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub created_at: DateTime<Utc>,
    pub channel: String,
    pub author: String,
    pub body: FeedBody,
}

impl TryFrom<RawFeedEntry> for FeedEntry {
    type Error = CrawlerError;

    fn try_from(raw: RawFeedEntry) -> CrawlerResult<Self> {
        let created_at = Utc
            .timestamp_opt(raw.created_utc, 0)
            .single()
            .ok_or_else(|| CrawlerError::malformed(format!("invalid timestamp {}", raw.created_utc)))?;

        let body = match raw.kind {
            RawEntryKind::Submission => FeedBody::Submission {
                text: raw.selftext.unwrap_or_default(),
            },
            RawEntryKind::Comment => FeedBody::Comment {
                text: raw
                    .body
                    .ok_or_else(|| CrawlerError::malformed("comment without body"))?,
            },
        };

        Ok(Self {
            created_at,
            channel: raw.channel,
            author: raw.author,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: RawEntryKind) -> RawFeedEntry {
        RawFeedEntry {
            kind,
            created_utc: 1_700_000_000,
            channel: "all".to_string(),
            author: "someone".to_string(),
            selftext: Some("submission text".to_string()),
            body: Some("comment text".to_string()),
        }
    }

    #[test]
    fn test_entry_text_resolved_by_kind() {
        let submission = FeedEntry::try_from(raw(RawEntryKind::Submission)).unwrap();
        assert_eq!(submission.body.text(), "submission text");
        assert_eq!(submission.body.kind(), FeedEntryKind::Submission);

        let comment = FeedEntry::try_from(raw(RawEntryKind::Comment)).unwrap();
        assert_eq!(comment.body.text(), "comment text");
    }

    #[test]
    fn test_comment_without_body_is_malformed() {
        let mut entry = raw(RawEntryKind::Comment);
        entry.body = None;
        assert!(matches!(
            FeedEntry::try_from(entry),
            Err(CrawlerError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_raw_entry_deserializes() {
        let json = r#"{"kind":"comment","created_utc":1700000000,"channel":"rust","author":"a","body":"hi"}"#;
        let entry: RawFeedEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, RawEntryKind::Comment);
        assert_eq!(entry.selftext, None);
    }
}
