//! Consistent test data for scheduler scenarios

use chrono::{DateTime, Duration, TimeZone, Utc};
use crawler::{ReviewPage, ReviewRecord, SearchResult};
use scheduler::SchedulerSettings;
use shared::{
    AuthorId, Content, ContentId, FeedEntryKind, RestartPolicy, SourceKind, SourceMetadata, Synonym, TaggedContent,
};
use url::Url;

pub struct TestFixtures;

impl TestFixtures {
    pub const HOST: &'static str = "https://reviews.example.com";

    pub fn url(path: &str) -> Url {
        Url::parse(&format!("{}/{}", Self::HOST, path)).unwrap()
    }

    pub fn result(label: &str, path: &str) -> SearchResult {
        SearchResult {
            label: label.to_string(),
            url: Self::url(path),
        }
    }

    pub fn review(author: &str, day: u32) -> ReviewRecord {
        ReviewRecord {
            title: None,
            body: format!("{author} reviewed it"),
            authored_at: Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap(),
            author: author.to_string(),
            review_count: 2,
        }
    }

    pub fn page(records: Vec<ReviewRecord>, next: Option<&str>) -> ReviewPage {
        ReviewPage {
            records,
            next_page: next.map(Self::url),
        }
    }

    /// Start of the window used by snapshot scenarios
    pub fn window_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 3, 10, 0, 0).unwrap()
    }

    /// A scored review for `synonym`, `minutes` into the snapshot window
    pub fn scored(id: &str, synonym: &str, minutes: i64, sentiment: f64) -> TaggedContent {
        TaggedContent::new(
            Content {
                id: ContentId::from(id),
                body: format!("post {id}"),
                authored_at: Self::window_start() + Duration::minutes(minutes),
                author: AuthorId::pseudonymize(SourceKind::Feed, id),
                origin: SourceMetadata::Feed {
                    channel: "gadgets".to_string(),
                    kind: FeedEntryKind::Submission,
                },
                sentiment: Some(sentiment),
            },
            Synonym::parse_all([synonym]),
        )
    }

    pub fn settings(manual: &[&str]) -> SchedulerSettings {
        SchedulerSettings {
            snapshot_window: std::time::Duration::from_secs(3600),
            cycle_sleep: std::time::Duration::from_millis(100),
            manual_synonyms: Synonym::parse_all(manual.iter().copied()),
            restart_policy: RestartPolicy::default(),
        }
    }
}
