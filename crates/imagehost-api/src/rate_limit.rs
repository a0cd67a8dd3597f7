//! Per-identity upload rate limiting
//!
//! A points-based quota over a fixed window, tracked per claimed account
//! in a sharded in-memory table. Fixed window is the accepted trade-off:
//! an identity can burst at a window boundary, but state stays O(active
//! identities) and consumption is a single lock acquisition. Consumption
//! is atomic per identity — the shard mutex serializes concurrent
//! requests, so two uploads cannot both claim the last points.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

const DEFAULT_SHARD_COUNT: usize = 16;
// Entries per shard before expired windows are evicted.
const MAX_ENTRIES_PER_SHARD: usize = 10_000;

/// Quota window for one identity.
#[derive(Debug, Clone)]
struct QuotaWindow {
    points_used: u32,
    resets_at: Instant,
}

impl QuotaWindow {
    fn new(window: Duration) -> Self {
        QuotaWindow {
            points_used: 0,
            resets_at: Instant::now() + window,
        }
    }
}

/// Rejected consumption attempt, with the wait until the window resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    pub retry_after: Duration,
}

/// Sharded fixed-window rate limiter keyed by identity.
#[derive(Clone)]
pub struct UploadRateLimiter {
    shards: Arc<Vec<Mutex<HashMap<String, QuotaWindow>>>>,
    shard_count: usize,
    points: u32,
    window: Duration,
}

impl UploadRateLimiter {
    /// Create a limiter granting `points` per `window` to each identity.
    pub fn new(points: u32, window: Duration) -> Self {
        Self::with_shards(points, window, DEFAULT_SHARD_COUNT)
    }

    pub fn with_shards(points: u32, window: Duration, shard_count: usize) -> Self {
        let shards = Arc::new((0..shard_count).map(|_| Mutex::new(HashMap::new())).collect());
        UploadRateLimiter {
            shards,
            shard_count,
            points,
            window,
        }
    }

    fn shard_index(&self, identity: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        identity.hash(&mut hasher);
        (hasher.finish() as usize) % self.shard_count
    }

    /// Consume `cost` points for `identity`. Returns the points remaining
    /// in the window, or how long to wait when the budget is exhausted.
    pub async fn consume(&self, identity: &str, cost: u32) -> Result<u32, RateLimited> {
        let shard = &self.shards[self.shard_index(identity)];
        let mut table = shard.lock().await;

        let now = Instant::now();
        if table.len() >= MAX_ENTRIES_PER_SHARD {
            table.retain(|_, window| window.resets_at > now);
        }

        let entry = table
            .entry(identity.to_string())
            .or_insert_with(|| QuotaWindow::new(self.window));

        if now >= entry.resets_at {
            entry.points_used = 0;
            entry.resets_at = now + self.window;
        }

        match entry.points_used.checked_add(cost) {
            Some(total) if total <= self.points => {
                entry.points_used = total;
                Ok(self.points - total)
            }
            _ => Err(RateLimited {
                retry_after: entry.resets_at.saturating_duration_since(now),
            }),
        }
    }

    /// Points still available to `identity` without consuming any.
    pub async fn remaining(&self, identity: &str) -> u32 {
        let shard = &self.shards[self.shard_index(identity)];
        let table = shard.lock().await;
        match table.get(identity) {
            Some(entry) if Instant::now() < entry.resets_at => {
                self.points.saturating_sub(entry.points_used)
            }
            _ => self.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_budget_allows_exact_number_of_uploads() {
        // 69 points, 23 per upload: three uploads, then rejection.
        let limiter = UploadRateLimiter::new(69, Duration::from_secs(3600));

        for _ in 0..3 {
            assert!(limiter.consume("alice", 23).await.is_ok());
        }
        let rejected = limiter.consume("alice", 23).await.unwrap_err();
        assert!(rejected.retry_after > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_identities_are_independent() {
        let limiter = UploadRateLimiter::new(23, Duration::from_secs(3600));

        assert!(limiter.consume("alice", 23).await.is_ok());
        assert!(limiter.consume("alice", 23).await.is_err());
        // A different identity's budget is untouched.
        assert!(limiter.consume("bob", 23).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_budget() {
        let limiter = UploadRateLimiter::new(23, Duration::from_secs(3600));

        assert!(limiter.consume("alice", 23).await.is_ok());
        assert!(limiter.consume("alice", 23).await.is_err());

        tokio::time::advance(Duration::from_secs(3601)).await;

        assert!(limiter.consume("alice", 23).await.is_ok());
    }

    #[tokio::test]
    async fn test_remaining_reports_without_consuming() {
        let limiter = UploadRateLimiter::new(69, Duration::from_secs(3600));
        assert_eq!(limiter.remaining("alice").await, 69);
        limiter.consume("alice", 23).await.unwrap();
        assert_eq!(limiter.remaining("alice").await, 46);
        assert_eq!(limiter.remaining("alice").await, 46);
    }

    #[tokio::test]
    async fn test_concurrent_consumption_of_last_points_admits_one() {
        let limiter = UploadRateLimiter::new(23, Duration::from_secs(3600));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.consume("alice", 23).await.is_ok() })
            })
            .collect();

        let mut admitted = 0;
        for task in tasks {
            if task.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }

    #[tokio::test]
    async fn test_oversized_cost_never_wraps() {
        let limiter = UploadRateLimiter::new(u32::MAX, Duration::from_secs(3600));
        limiter.consume("alice", u32::MAX).await.unwrap();
        // A further add would overflow points_used; must reject, not wrap.
        assert!(limiter.consume("alice", u32::MAX).await.is_err());
    }
}
