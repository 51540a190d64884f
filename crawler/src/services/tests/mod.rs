//! Tests for the HTTP collaborators, run against a local wiremock server

pub mod http_page_fetcher;
