//! Rolling-window request quota
//!
//! The proxy enforces a fixed quota per client key (normally an IP address)
//! over a rolling window. Timestamps older than the window are dropped on
//! every check, so quota recovers continuously rather than at fixed epochs.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Per-key rolling-window rate limiter
pub struct RollingWindowLimiter {
    max_requests: usize,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RollingWindowLimiter {
    /// Create a limiter allowing `max_requests` per `window` per key
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Create a limiter with the standard rolling 60-second window
    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    /// Try to admit one request for `key`.
    ///
    /// Returns true and records the hit when under quota; returns false
    /// without recording when the key is over quota.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock();
        let queue = hits.entry(key.to_string()).or_default();

        while queue
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            queue.pop_front();
        }

        if queue.len() >= self.max_requests {
            return false;
        }
        queue.push_back(now);
        true
    }

    /// Requests left in the current window for `key`
    pub fn remaining(&self, key: &str) -> usize {
        let now = Instant::now();
        let mut hits = self.hits.lock();
        let Some(queue) = hits.get_mut(key) else {
            return self.max_requests;
        };
        while queue
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            queue.pop_front();
        }
        self.max_requests.saturating_sub(queue.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_quota() {
        let limiter = RollingWindowLimiter::per_minute(3);

        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(!limiter.check("10.0.0.1"));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RollingWindowLimiter::per_minute(1);

        assert!(limiter.check("10.0.0.1"));
        assert!(!limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.2"));
    }

    #[test]
    fn test_rejected_requests_do_not_consume_quota() {
        let limiter = RollingWindowLimiter::per_minute(1);

        assert!(limiter.check("k"));
        assert!(!limiter.check("k"));
        assert!(!limiter.check("k"));
        assert_eq!(limiter.remaining("k"), 0);
    }

    #[test]
    fn test_window_rolls_over() {
        let limiter = RollingWindowLimiter::new(1, Duration::from_millis(30));

        assert!(limiter.check("k"));
        assert!(!limiter.check("k"));

        std::thread::sleep(Duration::from_millis(40));
        assert!(limiter.check("k"));
    }

    #[test]
    fn test_remaining_for_unseen_key() {
        let limiter = RollingWindowLimiter::per_minute(10);
        assert_eq!(limiter.remaining("fresh"), 10);
    }
}
