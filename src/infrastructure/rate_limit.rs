//! Rate limiter implementation
//!
//! Sliding-window request counting keyed by client and endpoint group.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Remaining requests in the current window
    pub remaining: u32,
    pub limit: u32,
    /// Time until the oldest request leaves the window (in seconds)
    pub reset_in_seconds: u64,
}

/// Sliding window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    /// Request timestamps per key
    records: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    window: Duration,
    cleanup_interval: Duration,
    last_cleanup: Arc<RwLock<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            window,
            cleanup_interval: Duration::from_secs(300),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    /// Check the limit for `key` and count the request if it is allowed
    pub async fn check_and_record(&self, key: &str, limit: u32) -> RateLimitResult {
        self.maybe_cleanup().await;

        let now = Instant::now();
        let window_start = now.checked_sub(self.window).unwrap_or(now);

        let mut records = self.records.write().await;
        let key_records = records.entry(key.to_string()).or_default();
        key_records.retain(|t| *t >= window_start);

        let in_window = key_records.len() as u32;

        if in_window >= limit {
            let reset_in = key_records
                .iter()
                .min()
                .map(|oldest| {
                    self.window
                        .saturating_sub(now.duration_since(*oldest))
                        .as_secs()
                })
                .unwrap_or(self.window.as_secs());

            return RateLimitResult {
                allowed: false,
                remaining: 0,
                limit,
                reset_in_seconds: reset_in,
            };
        }

        key_records.push(now);

        RateLimitResult {
            allowed: true,
            remaining: limit.saturating_sub(in_window + 1),
            limit,
            reset_in_seconds: self.window.as_secs(),
        }
    }

    async fn maybe_cleanup(&self) {
        let should_cleanup = {
            let last = self.last_cleanup.read().await;
            last.elapsed() >= self.cleanup_interval
        };

        if should_cleanup {
            let mut last = self.last_cleanup.write().await;
            *last = Instant::now();

            let now = Instant::now();
            let cutoff = now.checked_sub(self.window).unwrap_or(now);

            let mut records = self.records.write().await;

            for key_records in records.values_mut() {
                key_records.retain(|t| *t >= cutoff);
            }

            records.retain(|_, v| !v.is_empty());
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
