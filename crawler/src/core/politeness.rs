//! Minimum spacing between requests to a single remote host
//!
//! One gate per crawler, shared by every synonym: politeness is a property of
//! the host, so all frontiers advance on the same clock.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{CrawlerError, CrawlerResult};

/// Default spacing between two requests to the review site
pub const DEFAULT_POLITENESS_INTERVAL: Duration = Duration::from_secs(2);

pub struct PolitenessGate {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl PolitenessGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// Block until `interval` has passed since the last permitted request,
    /// then reserve the current instant as the new last request
    ///
    /// The reservation is made while the lock is held, so two callers can never
    /// be granted the same slot.
    pub async fn wait_if_needed(&self, cancel: &CancellationToken) -> CrawlerResult<()> {
        let mut last_request = self.last_request.lock().await;

        if let Some(last) = *last_request {
            let permitted_at = last + self.interval;
            if Instant::now() < permitted_at {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(CrawlerError::Cancelled),
                    _ = tokio::time::sleep_until(permitted_at) => {}
                }
            }
        }

        *last_request = Some(Instant::now());
        Ok(())
    }
}

impl Default for PolitenessGate {
    fn default() -> Self {
        Self::new(DEFAULT_POLITENESS_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_immediate() {
        let gate = PolitenessGate::default();
        let cancel = CancellationToken::new();
        let start = Instant::now();

        gate.wait_if_needed(&cancel).await.unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);

        gate.wait_if_needed(&cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_requests_are_spaced() {
        let gate = PolitenessGate::new(Duration::from_secs(2));
        let cancel = CancellationToken::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut grants = Vec::new();

        for _ in 0..50 {
            // Simulated work between requests, sometimes longer than the interval
            let work = Duration::from_millis(rng.gen_range(0..3_000));
            tokio::time::sleep(work).await;
            gate.wait_if_needed(&cancel).await.unwrap();
            grants.push(Instant::now());
        }

        for pair in grants.windows(2) {
            assert!(
                pair[1] - pair[0] >= Duration::from_secs(2),
                "requests only {:?} apart",
                pair[1] - pair[0]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waiters_get_distinct_slots() {
        let gate = std::sync::Arc::new(PolitenessGate::new(Duration::from_millis(500)));
        let cancel = CancellationToken::new();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let gate = gate.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                gate.wait_if_needed(&cancel).await.unwrap();
                Instant::now()
            }));
        }

        let mut grants = Vec::new();
        for handle in handles {
            grants.push(handle.await.unwrap());
        }
        grants.sort();
        for pair in grants.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(500));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_wait() {
        let gate = PolitenessGate::new(Duration::from_secs(60));
        let cancel = CancellationToken::new();
        gate.wait_if_needed(&cancel).await.unwrap();

        cancel.cancel();
        let result = gate.wait_if_needed(&cancel).await;
        assert!(matches!(result, Err(CrawlerError::Cancelled)));
    }
}
