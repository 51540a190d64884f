//! Windowed sentiment snapshots
//!
//! A snapshot covers one synonym over one window `[from, to)`: the average
//! score of every scored record in the window plus, per sentiment category,
//! the post count and the keywords extracted from that category's bodies.
//!
//! Categories are half-open so every score lands in exactly one of them:
//! negative is `[0, 0.5)`, positive is `[0.5, 1]`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use shared::{worker_warn, Synonym, WorkerId};

use crate::error::SchedulerResult;
use crate::traits::{KeywordService, SnapshotPublisher};
use crate::types::WindowRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    Negative,
    Positive,
}

impl SentimentCategory {
    pub const ALL: [SentimentCategory; 2] = [SentimentCategory::Negative, SentimentCategory::Positive];

    pub const BOUNDARY: f64 = 0.5;

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentCategory::Negative => "negative",
            SentimentCategory::Positive => "positive",
        }
    }

    pub fn contains(&self, score: f64) -> bool {
        match self {
            SentimentCategory::Negative => (0.0..Self::BOUNDARY).contains(&score),
            SentimentCategory::Positive => (Self::BOUNDARY..=1.0).contains(&score),
        }
    }

    /// The single category a score belongs to; `None` outside [0, 1]
    pub fn of(score: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.contains(score))
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    pub keywords: Vec<String>,
    pub post_count: usize,
}

/// Immutable aggregate for one synonym over one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    #[serde(serialize_with = "serialize_timestamp")]
    pub from: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub to: DateTime<Utc>,
    pub synonym: Synonym,
    #[serde(rename = "sentiment")]
    pub average_sentiment: f64,
    /// Sent as a JSON-encoded string
    #[serde(serialize_with = "serialize_statistics")]
    pub statistics: BTreeMap<SentimentCategory, CategoryStats>,
}

fn serialize_timestamp<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn serialize_statistics<S: Serializer>(
    value: &BTreeMap<SentimentCategory, CategoryStats>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let encoded = serde_json::to_string(value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&encoded)
}

impl Snapshot {
    /// Send to the aggregator; failures are logged and reported as `false`
    pub async fn publish<P>(&self, publisher: &P) -> bool
    where
        P: SnapshotPublisher + ?Sized,
    {
        match publisher.publish(self).await {
            Ok(()) => true,
            Err(e) => {
                worker_warn!(
                    WorkerId::Scheduler,
                    "Snapshot for '{}' [{}, {}) not published: {}",
                    self.synonym,
                    self.from,
                    self.to,
                    e
                );
                false
            }
        }
    }
}

/// Mean of `scores`, or `None` when empty
pub fn average(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Group scored bodies by category; unscored and out-of-range records are left out
pub fn partition(records: &[WindowRecord]) -> BTreeMap<SentimentCategory, Vec<String>> {
    let mut groups: BTreeMap<SentimentCategory, Vec<String>> = BTreeMap::new();
    for record in records {
        if let Some(category) = record.sentiment.and_then(SentimentCategory::of) {
            groups.entry(category).or_default().push(record.body.clone());
        }
    }
    groups
}

/// Build the snapshot for one synonym and window
///
/// Returns `None` when the window holds no scored content. Keywords are
/// requested once per non-empty category.
pub async fn build_snapshot<K>(
    synonym: &Synonym,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    records: &[WindowRecord],
    keywords: &K,
) -> SchedulerResult<Option<Snapshot>>
where
    K: KeywordService + ?Sized,
{
    let scores: Vec<f64> = records.iter().filter_map(|record| record.sentiment).collect();
    let Some(average_sentiment) = average(&scores) else {
        return Ok(None);
    };

    let mut statistics = BTreeMap::new();
    for (category, bodies) in partition(records) {
        let post_count = bodies.len();
        let extracted = keywords.extract(bodies).await?;
        statistics.insert(
            category,
            CategoryStats {
                keywords: extracted,
                post_count,
            },
        );
    }

    Ok(Some(Snapshot {
        from,
        to,
        synonym: synonym.clone(),
        average_sentiment,
        statistics,
    }))
}
