/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::sync::Arc;

use tracing::error;

use crate::error::{CoreError, CoreResult};
use crate::metrics::CoreMetrics;
use crate::social_db::SocialDb;

/// Store handle plus process counters, shared by every service.
#[derive(Clone)]
pub struct CoreContext {
    pub db: SocialDb,
    pub metrics: Arc<CoreMetrics>,
}

impl CoreContext {
    pub fn new(db: SocialDb, metrics: Arc<CoreMetrics>) -> Self {
        Self { db, metrics }
    }

    /// Runs a blocking store call off the async workers. Failures are counted,
    /// logged and surfaced as [`CoreError::Store`].
    pub async fn store<T, F>(&self, op: &'static str, f: F) -> CoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SocialDb) -> anyhow::Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        let res = tokio::task::spawn_blocking(move || f(&db)).await;
        let err = match res {
            Ok(Ok(v)) => return Ok(v),
            Ok(Err(e)) => CoreError::Store(e),
            Err(e) => CoreError::from(e),
        };
        self.metrics.store_error();
        error!(op, "store call failed: {err}");
        Err(err)
    }
}
