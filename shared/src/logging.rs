//! Shared logging utilities for consistent tracing across all workers

use crate::types::WorkerId;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Crates whose events are shown at the requested level
const FILTERED_CRATES: &[&str] = &["scheduler", "crawler", "shared"];

/// Build the default filter directive for a base level
pub fn default_filter(log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");
    let mut directives: Vec<String> = FILTERED_CRATES
        .iter()
        .map(|krate| format!("{krate}={base_level}"))
        .collect();
    directives.push("reqwest=warn".to_string());
    directives.push("hyper=warn".to_string());
    directives.join(",")
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` wins over `log_level` when it is set.
pub fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for worker-aware info logging
#[macro_export]
macro_rules! worker_info {
    ($worker:expr, $($arg:tt)*) => {
        tracing::info!(
            worker = %$worker,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for worker-aware warning logging
#[macro_export]
macro_rules! worker_warn {
    ($worker:expr, $($arg:tt)*) => {
        tracing::warn!(
            worker = %$worker,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for worker-aware error logging
#[macro_export]
macro_rules! worker_error {
    ($worker:expr, $($arg:tt)*) => {
        tracing::error!(
            worker = %$worker,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for worker-aware debug logging
#[macro_export]
macro_rules! worker_debug {
    ($worker:expr, $($arg:tt)*) => {
        tracing::debug!(
            worker = %$worker,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(worker: WorkerId, details: &str) {
    info!(
        worker = %worker,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(worker: WorkerId, reason: &str) {
    info!(
        worker = %worker,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(worker: WorkerId, context: &str, error: &dyn std::fmt::Display) {
    error!(
        worker = %worker,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}
