//! Simple rate limiting for user actions
//!
//! Prevents abuse by limiting how often a user can press buttons or start
//! renames.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Entries idle for longer than this are dropped by [`RateLimiter::cleanup`]
const CLEANUP_THRESHOLD: Duration = Duration::from_secs(60);

/// Thread-safe rate limiter using user IDs
pub struct RateLimiter {
    /// Map of user ID to last accepted action
    last_action: RwLock<HashMap<u64, Instant>>,
    /// Minimum interval between actions
    interval: Duration,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            last_action: RwLock::new(HashMap::new()),
            interval,
        }
    }

    /// Check if a user is rate limited
    ///
    /// Returns `true` if the user can proceed, `false` if rate limited.
    /// Updates the last action time if not rate limited.
    pub fn check(&self, user_id: u64) -> bool {
        self.check_at(user_id, Instant::now())
    }

    fn check_at(&self, user_id: u64, now: Instant) -> bool {
        let mut last = self.last_action.write().unwrap_or_else(|e| e.into_inner());
        if let Some(&last_time) = last.get(&user_id) {
            if now.saturating_duration_since(last_time) < self.interval {
                return false;
            }
        }

        last.insert(user_id, now);
        true
    }

    /// Clean up old entries (call periodically)
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    fn cleanup_at(&self, now: Instant) {
        let threshold = CLEANUP_THRESHOLD.max(self.interval);
        let mut last = self.last_action.write().unwrap_or_else(|e| e.into_inner());
        last.retain(|_, &mut instant| now.saturating_duration_since(instant) < threshold);
    }

    pub fn tracked_users(&self) -> usize {
        let last = self.last_action.read().unwrap_or_else(|e| e.into_inner());
        last.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let t0 = Instant::now();

        // First request should pass
        assert!(limiter.check_at(123, t0));

        // Immediate second request should fail
        assert!(!limiter.check_at(123, t0 + Duration::from_millis(500)));

        // Different user should pass
        assert!(limiter.check_at(456, t0));

        // After the interval the user may proceed again
        assert!(limiter.check_at(123, t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_zero_interval_never_limits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        let t0 = Instant::now();
        assert!(limiter.check_at(1, t0));
        assert!(limiter.check_at(1, t0));
    }

    #[test]
    fn test_cleanup() {
        let limiter = RateLimiter::new(Duration::from_secs(1));
        let t0 = Instant::now();
        limiter.check_at(1, t0);
        limiter.check_at(2, t0 + Duration::from_secs(50));

        limiter.cleanup_at(t0 + Duration::from_secs(61));
        assert_eq!(limiter.tracked_users(), 1);
    }
}
