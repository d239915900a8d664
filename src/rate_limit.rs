// src/rate_limit.rs
//! Fixed-window request limiter for mutating vault operations
//!
//! Keys are `client_address:route`. The table is owned by whoever builds the
//! service; there is no process-wide instance. Limits hold for one process
//! only.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::consts::DEFAULT_RATE_LIMIT_MAX_KEYS;

/// Result of one `check_and_consume` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Time until the current window closes.
    pub reset_in: Duration,
}

/// `limit` requests per `window` for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RoutePolicy {
    pub limit: u32,
    pub window_secs: u64,
}

impl RoutePolicy {
    pub const fn new(limit: u32, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

pub trait RateLimiter {
    /// Count one request against `key` and say whether it may proceed.
    fn check_and_consume(&self, key: &str, limit: u32, window: Duration) -> RateDecision;
}

/// `client_address:route`
pub fn rate_key(client_addr: &str, route: &str) -> String {
    format!("{client_addr}:{route}")
}

struct Window {
    count: u32,
    reset_at: Instant,
}

pub struct FixedWindowLimiter {
    windows: Mutex<HashMap<String, Window>>,
    max_keys: usize,
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT_MAX_KEYS)
    }
}

impl FixedWindowLimiter {
    pub fn new(max_keys: usize) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_keys: max_keys.max(1),
        }
    }

    /// Same as [`RateLimiter::check_and_consume`] with an explicit clock.
    pub fn check_and_consume_at(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> RateDecision {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if !windows.contains_key(key) && windows.len() >= self.max_keys {
            Self::make_room(&mut windows, self.max_keys, now);
        }

        let entry = windows.entry(key.to_owned()).or_insert(Window {
            count: 0,
            reset_at: now + window,
        });
        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + window;
        }

        let reset_in = entry.reset_at.saturating_duration_since(now);
        if entry.count >= limit {
            debug!(key, limit, "rate limit exceeded");
            return RateDecision { allowed: false, remaining: 0, reset_in };
        }

        entry.count += 1;
        RateDecision {
            allowed: true,
            remaining: limit - entry.count,
            reset_in,
        }
    }

    /// Drop windows that have closed.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let before = windows.len();
        windows.retain(|_, w| w.reset_at > now);
        before - windows.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn make_room(windows: &mut HashMap<String, Window>, max_keys: usize, now: Instant) {
        windows.retain(|_, w| w.reset_at > now);
        if windows.len() < max_keys {
            return;
        }
        // Still full: evict the window closest to closing.
        let oldest = windows
            .iter()
            .min_by_key(|(_, w)| w.reset_at)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            warn!(max_keys, "rate limit table full, evicting {key}");
            windows.remove(&key);
        }
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check_and_consume(&self, key: &str, limit: u32, window: Duration) -> RateDecision {
        self.check_and_consume_at(key, limit, window, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn allows_up_to_limit_then_blocks() {
        let limiter = FixedWindowLimiter::default();
        let now = Instant::now();
        let key = rate_key("10.0.0.1", "cards.create");

        for expected in (0..3).rev() {
            let d = limiter.check_and_consume_at(&key, 3, MINUTE, now);
            assert!(d.allowed);
            assert_eq!(d.remaining, expected);
        }
        let blocked = limiter.check_and_consume_at(&key, 3, MINUTE, now + Duration::from_secs(10));
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining, 0);
        assert_eq!(blocked.reset_in, Duration::from_secs(50));
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = FixedWindowLimiter::default();
        let now = Instant::now();
        assert!(limiter.check_and_consume_at("k", 1, MINUTE, now).allowed);
        assert!(!limiter.check_and_consume_at("k", 1, MINUTE, now).allowed);
        assert!(limiter.check_and_consume_at("k", 1, MINUTE, now + MINUTE).allowed);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = FixedWindowLimiter::default();
        let now = Instant::now();
        assert!(limiter.check_and_consume_at("a:r", 1, MINUTE, now).allowed);
        assert!(limiter.check_and_consume_at("b:r", 1, MINUTE, now).allowed);
        assert!(!limiter.check_and_consume_at("a:r", 1, MINUTE, now).allowed);
    }

    #[test]
    fn table_stays_bounded() {
        let limiter = FixedWindowLimiter::new(2);
        let now = Instant::now();
        limiter.check_and_consume_at("a", 5, MINUTE, now);
        limiter.check_and_consume_at("b", 5, MINUTE, now + Duration::from_secs(1));
        limiter.check_and_consume_at("c", 5, MINUTE, now + Duration::from_secs(2));
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn sweep_drops_closed_windows() {
        let limiter = FixedWindowLimiter::default();
        let now = Instant::now();
        limiter.check_and_consume_at("a", 5, MINUTE, now);
        limiter.check_and_consume_at("b", 5, MINUTE * 2, now);
        assert_eq!(limiter.sweep(now + MINUTE), 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
