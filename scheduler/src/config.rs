//! Scheduler configuration
//!
//! Values are read from the process environment after loading a `.env` file
//! from the current directory or its parents, if one exists. Environment
//! variables take precedence over the file.
//!
//! ## Required endpoints
//! - `SYNONYM_REGISTRY_URL`: authoritative synonym list
//! - `SENTIMENT_URL`: batch sentiment scoring
//! - `KEYWORDS_URL`: keyword extraction
//! - `SNAPSHOT_URL`: snapshot aggregator
//! - `REVIEW_SOURCE_URL`: review page extraction service
//! - `FEED_SOURCE_URL`: discussion feed polling endpoint
//!
//! ## Optional settings
//! - `SNAPSHOT_WINDOW_SECS` (3600)
//! - `CYCLE_SLEEP_MS` (1000)
//! - `POLITENESS_INTERVAL_MS` (2000)
//! - `FEED_POLL_INTERVAL_MS` (2000)
//! - `HTTP_TIMEOUT_SECS` (30)

use std::str::FromStr;
use std::time::Duration;

use shared::{RestartPolicy, SynonymSet};

use crate::error::{SchedulerError, SchedulerResult};

/// Remote collaborator endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub synonym_registry: String,
    pub sentiment: String,
    pub keywords: String,
    pub snapshot: String,
    pub review_source: String,
    pub feed_source: String,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub endpoints: Endpoints,
    pub snapshot_window: Duration,
    pub cycle_sleep: Duration,
    pub politeness_interval: Duration,
    pub feed_poll_interval: Duration,
    pub http_timeout: Duration,
    /// Always unioned into the registry's set
    pub manual_synonyms: SynonymSet,
    pub restart_policy: RestartPolicy,
}

impl SchedulerConfig {
    const REQUIRED_VARS: &'static [&'static str] = &[
        "SYNONYM_REGISTRY_URL",
        "SENTIMENT_URL",
        "KEYWORDS_URL",
        "SNAPSHOT_URL",
        "REVIEW_SOURCE_URL",
        "FEED_SOURCE_URL",
    ];

    pub const DEFAULT_WINDOW_SECS: u64 = 3600;
    pub const DEFAULT_CYCLE_SLEEP_MS: u64 = 1000;
    pub const DEFAULT_POLITENESS_MS: u64 = 2000;
    pub const DEFAULT_FEED_POLL_MS: u64 = 2000;
    pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

    /// Load from `.env` and the process environment
    pub fn from_env() -> SchedulerResult<Self> {
        // A missing .env file is fine
        let _ = dotenv::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<L>(lookup: L) -> SchedulerResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut values = Vec::with_capacity(Self::REQUIRED_VARS.len());
        let mut missing = Vec::new();
        for &name in Self::REQUIRED_VARS {
            match lookup(name).filter(|value| !value.trim().is_empty()) {
                Some(value) => values.push(value.trim().to_string()),
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(SchedulerError::RequiredEndpointMissing { variables: missing });
        }

        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        let endpoints = Endpoints {
            synonym_registry: next(),
            sentiment: next(),
            keywords: next(),
            snapshot: next(),
            review_source: next(),
            feed_source: next(),
        };

        let window_secs: u64 = optional(&lookup, "SNAPSHOT_WINDOW_SECS", Self::DEFAULT_WINDOW_SECS)?;
        if window_secs == 0 {
            return Err(SchedulerError::config("SNAPSHOT_WINDOW_SECS", "must be positive"));
        }

        Ok(Self {
            endpoints,
            snapshot_window: Duration::from_secs(window_secs),
            cycle_sleep: Duration::from_millis(optional(&lookup, "CYCLE_SLEEP_MS", Self::DEFAULT_CYCLE_SLEEP_MS)?),
            politeness_interval: Duration::from_millis(optional(
                &lookup,
                "POLITENESS_INTERVAL_MS",
                Self::DEFAULT_POLITENESS_MS,
            )?),
            feed_poll_interval: Duration::from_millis(optional(
                &lookup,
                "FEED_POLL_INTERVAL_MS",
                Self::DEFAULT_FEED_POLL_MS,
            )?),
            http_timeout: Duration::from_secs(optional(
                &lookup,
                "HTTP_TIMEOUT_SECS",
                Self::DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            manual_synonyms: SynonymSet::new(),
            restart_policy: RestartPolicy::default(),
        })
    }
}

fn optional<L, T>(lookup: &L, name: &str, default: T) -> SchedulerResult<T>
where
    L: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| SchedulerError::config(name, format!("invalid value '{}': {}", raw, e))),
    }
}
