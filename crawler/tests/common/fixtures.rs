//! Review pages and search results used across crawler tests

use chrono::{TimeZone, Utc};
use crawler::{ReviewPage, ReviewRecord, SearchResult};
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

    /// A review on 2024-05-`day` by `author`
    pub fn review(author: &str, day: u32) -> ReviewRecord {
        ReviewRecord {
            title: Some(format!("{author} on day {day}")),
            body: format!("{author} thinks it is fine"),
            authored_at: Utc.with_ymd_and_hms(2024, 5, day, 9, 30, 0).unwrap(),
            author: author.to_string(),
            review_count: 1,
        }
    }

    pub fn page(records: Vec<ReviewRecord>, next: Option<&str>) -> ReviewPage {
        ReviewPage {
            records,
            next_page: next.map(Self::url),
        }
    }
}
