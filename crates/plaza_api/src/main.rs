/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use plaza_core::Core;
use std::time::Duration;
use tracing::{debug, error, info};

mod app;
mod config;
mod error;
mod rpc;

use app::AppState;
use config::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = load_config()?;
    let core = Core::open(&cfg.db_path, cfg.busy_timeout(), cfg.limits())
        .with_context(|| format!("open store: {}", cfg.db_path.display()))?;

    for seed in &cfg.tenants {
        let tenant = core
            .tenancy
            .ensure_tenant(&seed.slug, seed.domain.as_deref())
            .await
            .with_context(|| format!("seed tenant {}", seed.slug))?;
        info!(tenant_id = tenant.id, slug = %tenant.slug, "tenant ready");
    }

    // Idle limiter buckets that have refilled are dropped periodically.
    let limiter = core.limiter.clone();
    let idle_for = Duration::from_secs(cfg.rl_idle_evict_secs);
    let sweep_every = Duration::from_secs(cfg.rl_sweep_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            let removed = limiter.evict_idle(idle_for).await;
            if removed > 0 {
                debug!(removed, "rate limiter buckets evicted");
            }
        }
    });

    let state = AppState {
        core,
        allow_dev_headers: cfg.allow_dev_headers,
    };
    let app = app::router(state, cfg.max_body_bytes);

    info!("plaza_api listening on http://{}", cfg.bind);
    if cfg.allow_dev_headers {
        info!("X-Tenant / X-User dev headers accepted");
    }
    let listener = tokio::net::TcpListener::bind(cfg.bind)
        .await
        .with_context(|| format!("bind {}", cfg.bind))?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {e:#}");
        return Err(e.into());
    }
    info!("plaza_api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("ctrl_c handler failed: {e}");
        std::future::pending::<()>().await;
    }
}
