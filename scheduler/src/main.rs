//! Entry point for the scheduler binary
//!
//! Wires the HTTP collaborators, the in-memory store and both crawl sources
//! into a `Scheduler` and runs it until Ctrl-C.

use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crawler::CrawlerConfig;
use scheduler::services::{
    FeedSourceFactory, HttpKeywordService, HttpSentimentService, HttpSnapshotPublisher, HttpSynonymRegistry,
    MemoryContentStore, ReviewSourceFactory,
};
use scheduler::{ContentStore, Scheduler, SchedulerConfig, SchedulerSettings, SupervisedSource};
use shared::{logging, worker_debug, worker_info, Synonym, WorkerId};

/// Tracks synonyms across review and discussion sources and publishes
/// windowed sentiment snapshots
#[derive(Parser)]
#[command(name = "scheduler")]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Snapshot window in seconds (overrides SNAPSHOT_WINDOW_SECS)
    #[arg(long)]
    pub window_secs: Option<u64>,

    /// Feed poll interval in milliseconds (overrides FEED_POLL_INTERVAL_MS)
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Minimum spacing between review-site requests in milliseconds
    /// (overrides POLITENESS_INTERVAL_MS)
    #[arg(long)]
    pub politeness_ms: Option<u64>,

    /// Always track this term, whatever the registry says (repeatable)
    #[arg(long = "synonym")]
    pub synonyms: Vec<String>,

    /// Wipe the content store before starting
    #[arg(long)]
    pub clear_store: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    let mut config = SchedulerConfig::from_env().context("loading configuration")?;
    if let Some(secs) = args.window_secs {
        anyhow::ensure!(secs > 0, "--window-secs must be positive");
        config.snapshot_window = Duration::from_secs(secs);
    }
    if let Some(ms) = args.poll_interval_ms {
        config.feed_poll_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = args.politeness_ms {
        config.politeness_interval = Duration::from_millis(ms);
    }
    for term in &args.synonyms {
        let synonym = Synonym::new(term).with_context(|| format!("invalid --synonym '{}'", term))?;
        config.manual_synonyms.insert(synonym);
    }
    worker_debug!(WorkerId::Scheduler, "Configuration: {:?}", config);

    let cancel = CancellationToken::new();
    let endpoints = &config.endpoints;
    let timeout = config.http_timeout;

    let reviews = ReviewSourceFactory::new(
        &endpoints.review_source,
        CrawlerConfig {
            politeness_interval: config.politeness_interval,
            restart_policy: config.restart_policy.clone(),
            ..CrawlerConfig::default()
        },
        timeout,
        cancel.clone(),
    );
    let feed = FeedSourceFactory::new(
        &endpoints.feed_source,
        config.feed_poll_interval,
        timeout,
        config.restart_policy.clone(),
        cancel.clone(),
    );

    let store = MemoryContentStore::new();
    if args.clear_store {
        let removed = store.clear_all().await?;
        worker_info!(WorkerId::Scheduler, "🧹 Cleared {} stored records", removed);
    }

    let scheduler = Scheduler::new(
        HttpSynonymRegistry::new(&endpoints.synonym_registry, timeout)?,
        HttpSentimentService::new(&endpoints.sentiment, timeout)?,
        HttpKeywordService::new(&endpoints.keywords, timeout)?,
        HttpSnapshotPublisher::new(&endpoints.snapshot, timeout)?,
        store,
        vec![
            SupervisedSource::new(Box::new(reviews)),
            SupervisedSource::new(Box::new(feed)),
        ],
        SchedulerSettings {
            snapshot_window: config.snapshot_window,
            cycle_sleep: config.cycle_sleep,
            manual_synonyms: config.manual_synonyms.clone(),
            restart_policy: config.restart_policy.clone(),
        },
    )?;

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                worker_info!(WorkerId::Scheduler, "🛑 Shutdown requested");
                shutdown.cancel();
            }
            Err(e) => logging::log_error(WorkerId::Scheduler, "installing Ctrl-C handler", &e),
        }
    });

    scheduler.run(&cancel).await?;
    Ok(())
}
