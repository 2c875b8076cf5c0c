//! Minimum-interval gate for next-page dispatches.

use std::time::Duration;
use tokio::time::Instant;

/// Allows at most one acquisition per `interval`.
///
/// Rejected attempts are dropped, not deferred.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// Returns `true` and records `now` if the previous acquisition is at least
    /// `interval` old.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        let allowed = self
            .last
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if allowed {
            self.last = Some(now);
        }
        allowed
    }

    /// Forgets the last acquisition.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inside_window_and_accepts_after() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_secs(3));

        assert!(throttle.try_acquire(start));
        assert!(!throttle.try_acquire(start + Duration::from_millis(500)));
        assert!(!throttle.try_acquire(start + Duration::from_millis(2999)));
        assert!(throttle.try_acquire(start + Duration::from_secs(3)));
    }

    #[test]
    fn zero_interval_never_rejects() {
        let now = Instant::now();
        let mut throttle = Throttle::new(Duration::ZERO);
        assert!(throttle.try_acquire(now));
        assert!(throttle.try_acquire(now));
    }

    #[test]
    fn reset_reopens_the_window() {
        let now = Instant::now();
        let mut throttle = Throttle::new(Duration::from_secs(60));
        assert!(throttle.try_acquire(now));
        throttle.reset();
        assert!(throttle.try_acquire(now));
    }
}
