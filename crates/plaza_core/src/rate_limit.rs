/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Per-key token buckets with lazy continuous refill.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::model::Scope;

/// Capacity and refill for one action. Either value at 0 disables limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub capacity: u32,
    pub refill_per_minute: u32,
}

impl RateLimit {
    /// `n` actions per minute with a burst of `n`.
    pub const fn per_minute(n: u32) -> Self {
        Self {
            capacity: n,
            refill_per_minute: n,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.capacity == 0 || self.refill_per_minute == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_min: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn fresh(limit: RateLimit, now: Instant) -> Self {
        let capacity = f64::from(limit.capacity);
        Self {
            capacity,
            // The call that creates the bucket is admitted.
            tokens: capacity - 1.0,
            refill_per_min: f64::from(limit.refill_per_minute),
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        self.tokens = self.projected(now);
        self.last_refill = now;
    }

    fn take(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens the bucket would hold at `now`, without mutating it.
    fn projected(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        (self.tokens + elapsed * self.refill_per_min / 60.0).min(self.capacity)
    }
}

/// Process-wide admission control. One critical section guards the whole map;
/// key cardinality is one bucket per (action, tenant, user).
#[derive(Debug, Default)]
pub struct RateLimiter {
    inner: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn allow(&self, key: &str, limit: RateLimit) -> bool {
        self.allow_at(key, limit, Instant::now()).await
    }

    /// Same as [`RateLimiter::allow`] with an explicit clock reading.
    pub async fn allow_at(&self, key: &str, limit: RateLimit, now: Instant) -> bool {
        if limit.is_disabled() {
            return true;
        }
        let mut map = self.inner.lock().await;
        match map.get_mut(key) {
            Some(bucket) => bucket.take(now),
            None => {
                map.insert(key.to_string(), TokenBucket::fresh(limit, now));
                true
            }
        }
    }

    /// Drops buckets untouched for `idle_for` that have already refilled to
    /// capacity. A bucket recreated on the next call ends up in the same
    /// state, so callers cannot tell it was evicted. Returns the number removed.
    pub async fn evict_idle(&self, idle_for: Duration) -> usize {
        self.evict_idle_at(idle_for, Instant::now()).await
    }

    pub async fn evict_idle_at(&self, idle_for: Duration, now: Instant) -> usize {
        let mut map = self.inner.lock().await;
        let before = map.len();
        map.retain(|_, b| {
            let idle = now.saturating_duration_since(b.last_refill) >= idle_for;
            !(idle && b.projected(now) >= b.capacity)
        });
        before - map.len()
    }

    pub async fn bucket_count(&self) -> usize {
        self.inner.lock().await.len()
    }
}

/// Bucket key for an action performed by a user within a tenant.
pub fn limiter_key(action: &str, scope: &Scope) -> String {
    format!("{action}:{}:{}", scope.tenant_id, scope.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const TEN: RateLimit = RateLimit::per_minute(10);

    #[tokio::test]
    async fn burst_then_deny_then_one_refill() {
        let rl = RateLimiter::new();
        let t0 = Instant::now();
        for i in 0..10 {
            assert!(rl.allow_at("post:1:1", TEN, t0).await, "call {i} should pass");
        }
        assert!(!rl.allow_at("post:1:1", TEN, t0).await);

        let t6 = t0 + Duration::from_secs(6);
        assert!(rl.allow_at("post:1:1", TEN, t6).await);
        assert!(!rl.allow_at("post:1:1", TEN, t6).await);
    }

    #[tokio::test]
    async fn zero_capacity_or_rate_disables_limiting() {
        let rl = RateLimiter::new();
        let t0 = Instant::now();
        let no_cap = RateLimit {
            capacity: 0,
            refill_per_minute: 5,
        };
        let no_rate = RateLimit {
            capacity: 5,
            refill_per_minute: 0,
        };
        for _ in 0..100 {
            assert!(rl.allow_at("k", no_cap, t0).await);
            assert!(rl.allow_at("k", no_rate, t0).await);
        }
        assert_eq!(rl.bucket_count().await, 0);
    }

    #[tokio::test]
    async fn refill_is_continuous() {
        let rl = RateLimiter::new();
        let limit = RateLimit {
            capacity: 1,
            refill_per_minute: 60,
        };
        let t0 = Instant::now();
        assert!(rl.allow_at("k", limit, t0).await);
        // Half a token is not enough, the second half completes it.
        assert!(!rl.allow_at("k", limit, t0 + Duration::from_millis(500)).await);
        assert!(rl.allow_at("k", limit, t0 + Duration::from_millis(1000)).await);
    }

    #[tokio::test]
    async fn long_idle_refills_only_to_capacity() {
        let rl = RateLimiter::new();
        let limit = RateLimit::per_minute(3);
        let t0 = Instant::now();
        for _ in 0..3 {
            assert!(rl.allow_at("k", limit, t0).await);
        }
        let later = t0 + Duration::from_secs(3600);
        for _ in 0..3 {
            assert!(rl.allow_at("k", limit, later).await);
        }
        assert!(!rl.allow_at("k", limit, later).await);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let rl = RateLimiter::new();
        let one = RateLimit::per_minute(1);
        let t0 = Instant::now();
        let a = Scope { tenant_id: 1, user_id: 1 };
        let b = Scope { tenant_id: 2, user_id: 1 };
        assert!(rl.allow_at(&limiter_key("post", &a), one, t0).await);
        assert!(!rl.allow_at(&limiter_key("post", &a), one, t0).await);
        assert!(rl.allow_at(&limiter_key("comment", &a), one, t0).await);
        assert!(rl.allow_at(&limiter_key("post", &b), one, t0).await);
        assert_eq!(limiter_key("post", &a), "post:1:1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_never_overdraw() {
        let rl = Arc::new(RateLimiter::new());
        let t0 = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..50 {
            let rl = rl.clone();
            handles.push(tokio::spawn(async move { rl.allow_at("hot", TEN, t0).await }));
        }
        let mut admitted = 0;
        for h in handles {
            if h.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }

    #[tokio::test]
    async fn eviction_only_drops_refilled_idle_buckets() {
        let rl = RateLimiter::new();
        let t0 = Instant::now();
        assert!(rl.allow_at("idle", TEN, t0).await);
        for _ in 0..10 {
            rl.allow_at("drained", TEN, t0).await;
        }
        assert_eq!(rl.bucket_count().await, 2);

        // Ten seconds: "idle" is full again, "drained" holds under two tokens.
        let t10 = t0 + Duration::from_secs(10);
        assert_eq!(rl.evict_idle_at(Duration::from_secs(5), t10).await, 1);
        assert_eq!(rl.bucket_count().await, 1);

        let t2m = t0 + Duration::from_secs(120);
        assert_eq!(rl.evict_idle_at(Duration::from_secs(5), t2m).await, 1);
        assert_eq!(rl.bucket_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn allow_uses_the_runtime_clock() {
        let rl = RateLimiter::new();
        let one = RateLimit::per_minute(1);
        assert!(rl.allow("k", one).await);
        assert!(!rl.allow("k", one).await);
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(rl.allow("k", one).await);
    }
}
