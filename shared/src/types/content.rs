//! Scraped content records and their derived identifiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::{SourceKind, SynonymSet};

/// Hex characters kept from the SHA-256 digest of a content natural key
const CONTENT_ID_LEN: usize = 32;

/// Hex characters kept from the SHA-256 digest of an author name
const AUTHOR_ID_LEN: usize = 16;

/// Field separator inside hashed natural keys (ASCII unit separator)
const KEY_SEPARATOR: char = '\u{1f}';

/// Stable content identifier, used as the store's idempotency key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Derive an identifier from a source-specific natural key
    ///
    /// The same source and key parts always produce the same identifier, which
    /// is what makes re-ingesting a record after a restart harmless.
    pub fn derive(source: SourceKind, key_parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.as_str().as_bytes());
        for part in key_parts {
            hasher.update(KEY_SEPARATOR.to_string().as_bytes());
            hasher.update(part.as_bytes());
        }
        let digest = format!("{:x}", hasher.finalize());
        Self(digest[..CONTENT_ID_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Pseudonymous author identifier; the raw author name is never kept
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(String);

impl AuthorId {
    pub fn pseudonymize(source: SourceKind, raw_author: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"author");
        hasher.update(KEY_SEPARATOR.to_string().as_bytes());
        hasher.update(source.as_str().as_bytes());
        hasher.update(KEY_SEPARATOR.to_string().as_bytes());
        hasher.update(raw_author.trim().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Self(digest[..AUTHOR_ID_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of discussion entry a feed record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedEntryKind {
    Submission,
    Comment,
}

impl FeedEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedEntryKind::Submission => "submission",
            FeedEntryKind::Comment => "comment",
        }
    }
}

impl fmt::Display for FeedEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source-specific details persisted with a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SourceMetadata {
    /// Reviews the reviewer had written when this one was scraped
    Reviews { review_count: u32 },
    Feed { channel: String, kind: FeedEntryKind },
}

impl SourceMetadata {
    pub fn source(&self) -> SourceKind {
        match self {
            SourceMetadata::Reviews { .. } => SourceKind::Reviews,
            SourceMetadata::Feed { .. } => SourceKind::Feed,
        }
    }
}

/// Immutable scraped payload
///
/// `sentiment` is absent until the scheduler's backfill step scores it and is
/// never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    pub body: String,
    pub authored_at: DateTime<Utc>,
    pub author: AuthorId,
    pub origin: SourceMetadata,
    pub sentiment: Option<f64>,
}

impl Content {
    pub fn source(&self) -> SourceKind {
        self.origin.source()
    }
}

/// Content as produced by a crawl source, tagged with every synonym it matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedContent {
    pub content: Content,
    pub synonyms: SynonymSet,
}

impl TaggedContent {
    pub fn new(content: Content, synonyms: SynonymSet) -> Self {
        Self { content, synonyms }
    }

    pub fn id(&self) -> &ContentId {
        &self.content.id
    }
}
