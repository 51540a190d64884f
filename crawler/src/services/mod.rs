//! HTTP implementations of the crawler's fetch collaborators

pub mod http_feed_client;
pub mod http_page_fetcher;

#[cfg(test)]
mod tests;

pub use http_feed_client::{FeedCursors, HttpFeedClient};
pub use http_page_fetcher::HttpPageFetcher;
