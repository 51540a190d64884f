//! Crawl sources for the synonym tracker
//!
//! The primary source is a single-host review site walked through per-synonym
//! frontiers in round-robin order under a politeness gate. The secondary
//! source is a discussion feed filtered by token matching. Both buffer their
//! output for the scheduler to drain.

pub mod core;
pub mod crawler;
pub mod error;
pub mod feed_scraper;
pub mod services;
pub mod traits;
pub mod types;

pub use crate::crawler::{review_to_content, Crawler, CrawlerConfig, StepOutcome};
pub use error::{CrawlerError, CrawlerResult};
pub use feed_scraper::{feed_to_content, FeedScraper};
pub use services::{FeedCursors, HttpFeedClient, HttpPageFetcher};
pub use traits::*;
pub use types::*;
