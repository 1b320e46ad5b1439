/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub mod context;
pub mod cursor;
pub mod dm;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pagination;
pub mod rate_limit;
pub mod reactions;
pub mod social_db;
pub mod tenancy;
pub mod timeline;

pub use context::CoreContext;
pub use error::{CoreError, CoreResult};
pub use model::Scope;

use dm::DmService;
use metrics::CoreMetrics;
use rate_limit::RateLimiter;
use reactions::ReactionService;
use social_db::SocialDb;
use tenancy::TenancyService;
use timeline::{TimelineLimits, TimelineService};

/// Every service wired to one store, one limiter and one set of counters.
#[derive(Clone)]
pub struct Core {
    pub ctx: CoreContext,
    pub limiter: Arc<RateLimiter>,
    pub tenancy: TenancyService,
    pub timeline: TimelineService,
    pub reactions: ReactionService,
    pub dm: DmService,
}

impl Core {
    pub fn new(db: SocialDb, limits: TimelineLimits) -> Self {
        let ctx = CoreContext::new(db, Arc::new(CoreMetrics::new()));
        let limiter = Arc::new(RateLimiter::new());
        Self {
            tenancy: TenancyService::new(ctx.clone()),
            timeline: TimelineService::new(ctx.clone(), limiter.clone(), limits),
            reactions: ReactionService::new(ctx.clone()),
            dm: DmService::new(ctx.clone()),
            limiter,
            ctx,
        }
    }

    pub fn open(db_path: impl AsRef<Path>, busy_timeout: Duration, limits: TimelineLimits) -> anyhow::Result<Self> {
        Ok(Self::new(SocialDb::open(db_path, busy_timeout)?, limits))
    }

    pub fn metrics(&self) -> &CoreMetrics {
        &self.ctx.metrics
    }
}
