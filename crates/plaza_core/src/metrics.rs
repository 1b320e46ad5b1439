/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct CoreMetrics {
    pub requests: AtomicU64,
    pub rate_limit_hits: AtomicU64,
    pub conversations_created: AtomicU64,
    pub dm_conflicts_recovered: AtomicU64,
    pub store_errors: AtomicU64,
}

impl CoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rate_limit_hit(&self) {
        self.rate_limit_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn conversation_created(&self) {
        self.conversations_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dm_conflict_recovered(&self) {
        self.dm_conflicts_recovered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests": self.requests.load(Ordering::Relaxed),
            "rate_limit_hits": self.rate_limit_hits.load(Ordering::Relaxed),
            "conversations_created": self.conversations_created.load(Ordering::Relaxed),
            "dm_conflicts_recovered": self.dm_conflicts_recovered.load(Ordering::Relaxed),
            "store_errors": self.store_errors.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let m = CoreMetrics::new();
        m.request();
        m.request();
        m.rate_limit_hit();
        let snap = m.snapshot_json();
        assert_eq!(snap["requests"], 2);
        assert_eq!(snap["rate_limit_hits"], 1);
        assert_eq!(snap["store_errors"], 0);
    }
}
