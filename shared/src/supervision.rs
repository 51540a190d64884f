//! Restart-with-backoff supervision for long-running workers
//!
//! Every background loop in the system (frontier worker, feed streams,
//! orchestration cycle) runs under [`supervise`]: an error ends the current
//! run, the supervisor waits an exponentially growing, capped delay and starts
//! the body again. Only cancellation or a clean `Ok(())` ends supervision.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::types::WorkerId;
use crate::{worker_debug, worker_warn};

/// Exponential restart delays, capped at `max_delay`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartPolicy {
    pub initial_delay: Duration,
    pub factor: u32,
    pub max_delay: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            factor: 2,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RestartPolicy {
    pub fn new(initial_delay: Duration, factor: u32, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            factor: factor.max(1),
            max_delay,
        }
    }

    /// Delay before restart number `attempt` (zero-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let mut delay = self.initial_delay;
        for _ in 0..attempt {
            delay = delay.saturating_mul(self.factor);
            if delay >= self.max_delay {
                return self.max_delay;
            }
        }
        delay.min(self.max_delay)
    }
}

/// How a supervised worker ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// The cancellation token fired
    Cancelled,
    /// The body returned `Ok(())`
    Completed,
}

/// Run `body` until it succeeds or `cancel` fires, restarting it with backoff
/// after every error
///
/// A run that lasted longer than the policy's cap before failing resets the
/// backoff, so a worker that fails once a day always restarts quickly.
pub async fn supervise<F, Fut, E>(
    worker: WorkerId,
    policy: &RestartPolicy,
    cancel: &CancellationToken,
    mut body: F,
) -> SupervisorExit
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: fmt::Display,
{
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return SupervisorExit::Cancelled;
        }

        let started = Instant::now();
        let result = tokio::select! {
            _ = cancel.cancelled() => return SupervisorExit::Cancelled,
            result = body() => result,
        };

        match result {
            Ok(()) => {
                worker_debug!(worker, "Supervised worker completed");
                return SupervisorExit::Completed;
            }
            Err(e) => {
                if started.elapsed() > policy.max_delay {
                    attempt = 0;
                }
                let delay = policy.delay_for(attempt);
                attempt = attempt.saturating_add(1);
                worker_warn!(worker, "🔁 Worker failed: {}. Restarting in {:?}", e, delay);

                tokio::select! {
                    _ = cancel.cancelled() => return SupervisorExit::Cancelled,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = RestartPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(7), Duration::from_secs(60));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarts_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let counter = calls.clone();
        let exit = supervise(WorkerId::Crawler, &RestartPolicy::default(), &cancel, move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                    Err("transient")
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(exit, SupervisorExit::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 0.5s + 1s + 2s of backoff
        assert_eq!(started.elapsed(), Duration::from_millis(3500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_backoff() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let policy = RestartPolicy::new(Duration::from_secs(30), 2, Duration::from_secs(60));
        let exit = supervise(WorkerId::Scheduler, &policy, &cancel, || async { Err::<(), _>("always") }).await;

        assert_eq!(exit, SupervisorExit::Cancelled);
    }

    #[tokio::test]
    async fn test_already_cancelled_never_runs_body() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = AtomicU32::new(0);

        let exit = supervise(WorkerId::FeedItems, &RestartPolicy::default(), &cancel, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), String>(()) }
        })
        .await;

        assert_eq!(exit, SupervisorExit::Cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
