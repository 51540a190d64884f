//! Snapshot watermark
//!
//! The watermark is the start of the next window to aggregate. A window
//! `[w, w + size)` is processed only once the clock passes `w + 2 * size`,
//! which leaves a full window of slack for late-arriving and unscored
//! content. Each pass advances the watermark by exactly one window, so a
//! scheduler that fell behind catches up one window per cycle.

use chrono::{DateTime, Duration as ChronoDuration, DurationRound, Utc};
use std::time::Duration;

use crate::error::{SchedulerError, SchedulerResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watermark {
    position: DateTime<Utc>,
    window: ChronoDuration,
}

impl Watermark {
    /// Start at `now` rounded down to a window boundary
    pub fn starting_at(now: DateTime<Utc>, window: Duration) -> SchedulerResult<Self> {
        let window = ChronoDuration::from_std(window)
            .ok()
            .filter(|w| *w > ChronoDuration::zero())
            .ok_or_else(|| SchedulerError::config("snapshot_window", "must be a positive duration"))?;
        let position = now
            .duration_trunc(window)
            .map_err(|e| SchedulerError::config("snapshot_window", e.to_string()))?;
        Ok(Self { position, window })
    }

    pub fn position(&self) -> DateTime<Utc> {
        self.position
    }

    /// The window the next pass covers
    pub fn current_window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.position, self.position + self.window)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now > self.position + self.window * 2
    }

    pub fn advance(&mut self) {
        self.position += self.window;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 3, h, m, 0).unwrap()
    }

    #[test]
    fn test_starts_on_window_boundary() {
        let watermark = Watermark::starting_at(at(10, 42), Duration::from_secs(3600)).unwrap();
        assert_eq!(watermark.position(), at(10, 0));
        assert_eq!(watermark.current_window(), (at(10, 0), at(11, 0)));
    }

    #[test]
    fn test_due_only_after_two_windows() {
        let watermark = Watermark::starting_at(at(10, 0), Duration::from_secs(3600)).unwrap();
        assert!(!watermark.is_due(at(11, 59)));
        assert!(!watermark.is_due(at(12, 0)));
        assert!(watermark.is_due(at(12, 1)));
    }

    #[test]
    fn test_advance_moves_one_window() {
        let mut watermark = Watermark::starting_at(at(10, 0), Duration::from_secs(3600)).unwrap();
        let far_future = at(18, 0);
        let mut passes = 0;
        while watermark.is_due(far_future) {
            watermark.advance();
            passes += 1;
        }
        assert_eq!(passes, 6);
        assert_eq!(watermark.position(), at(16, 0));
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(Watermark::starting_at(at(10, 0), Duration::ZERO).is_err());
    }
}
