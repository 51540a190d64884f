//! Record builders shared by the unit tests

use chrono::{DateTime, TimeZone, Utc};
use shared::{AuthorId, Content, ContentId, SourceKind, SourceMetadata, Synonym, TaggedContent};

pub fn authored() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 3, 10, 30, 0).unwrap()
}

pub fn tagged(id: &str, synonyms: &[&str], sentiment: Option<f64>) -> TaggedContent {
    TaggedContent::new(
        Content {
            id: ContentId::from(id),
            body: format!("body of {id}"),
            authored_at: authored(),
            author: AuthorId::pseudonymize(SourceKind::Reviews, "someone"),
            origin: SourceMetadata::Reviews { review_count: 1 },
            sentiment,
        },
        Synonym::parse_all(synonyms.iter().copied()),
    )
}
