/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use plaza_core::rate_limit::RateLimit;
use plaza_core::timeline::TimelineLimits;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantSeed {
    pub slug: String,
    pub domain: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub db_busy_timeout_ms: u64,
    pub allow_dev_headers: bool,
    pub max_body_bytes: usize,
    pub post_per_min: u32,
    pub comment_per_min: u32,
    pub rl_idle_evict_secs: u64,
    pub rl_sweep_interval_secs: u64,
    pub tenants: Vec<TenantSeed>,
}

impl ApiConfig {
    pub fn limits(&self) -> TimelineLimits {
        TimelineLimits {
            post: RateLimit::per_minute(self.post_per_min),
            comment: RateLimit::per_minute(self.comment_per_min),
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.db_busy_timeout_ms)
    }
}

pub fn load_config() -> Result<ApiConfig> {
    load_config_from(|k| std::env::var(k).ok())
}

pub fn load_config_from(var: impl Fn(&str) -> Option<String>) -> Result<ApiConfig> {
    let bind = var("PLAZA_BIND").unwrap_or_else(|| "127.0.0.1:8080".to_string());
    let bind: SocketAddr = bind
        .parse()
        .with_context(|| format!("PLAZA_BIND invalid: {bind}"))?;
    let db_path = PathBuf::from(var("PLAZA_DB").unwrap_or_else(|| "plaza.sqlite".to_string()));
    let db_busy_timeout_ms = var("PLAZA_DB_BUSY_TIMEOUT_MS")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(5_000)
        .min(60_000);
    let allow_dev_headers = var("PLAZA_ALLOW_DEV_HEADERS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(true);
    let max_body_bytes = var("PLAZA_MAX_BODY_BYTES")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(64 * 1024)
        .max(1024);
    let post_per_min = var("PLAZA_RL_POST_PER_MIN")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(10);
    let comment_per_min = var("PLAZA_RL_COMMENT_PER_MIN")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(20);
    let rl_idle_evict_secs = var("PLAZA_RL_IDLE_EVICT_SECS")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(600)
        .max(60);
    let rl_sweep_interval_secs = var("PLAZA_RL_SWEEP_INTERVAL_SECS")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
        .max(1);
    let tenants = var("PLAZA_TENANTS")
        .map(|v| parse_tenant_seeds(&v))
        .unwrap_or_default();

    Ok(ApiConfig {
        bind,
        db_path,
        db_busy_timeout_ms,
        allow_dev_headers,
        max_body_bytes,
        post_per_min,
        comment_per_min,
        rl_idle_evict_secs,
        rl_sweep_interval_secs,
        tenants,
    })
}

/// `slug[=domain]` entries separated by commas.
fn parse_tenant_seeds(v: &str) -> Vec<TenantSeed> {
    v.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|entry| {
            let (slug, domain) = match entry.split_once('=') {
                Some((s, d)) => (s.trim(), Some(d.trim())),
                None => (entry, None),
            };
            if slug.is_empty() {
                return None;
            }
            Some(TenantSeed {
                slug: slug.to_string(),
                domain: domain.filter(|d| !d.is_empty()).map(str::to_string),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<ApiConfig> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        load_config_from(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let c = cfg(&[]).unwrap();
        assert_eq!(c.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(c.db_busy_timeout_ms, 5_000);
        assert!(c.allow_dev_headers);
        assert_eq!(c.limits().post, RateLimit::per_minute(10));
        assert_eq!(c.limits().comment, RateLimit::per_minute(20));
        assert!(c.tenants.is_empty());
    }

    #[test]
    fn values_are_clamped_and_parsed() {
        let c = cfg(&[
            ("PLAZA_DB_BUSY_TIMEOUT_MS", "999999"),
            ("PLAZA_ALLOW_DEV_HEADERS", "false"),
            ("PLAZA_RL_POST_PER_MIN", "0"),
            ("PLAZA_TENANTS", "acme=acme.example.com, globex ,=bad,"),
        ])
        .unwrap();
        assert_eq!(c.db_busy_timeout_ms, 60_000);
        assert!(!c.allow_dev_headers);
        assert!(c.limits().post.is_disabled());
        assert_eq!(
            c.tenants,
            vec![
                TenantSeed {
                    slug: "acme".to_string(),
                    domain: Some("acme.example.com".to_string())
                },
                TenantSeed {
                    slug: "globex".to_string(),
                    domain: None
                },
            ]
        );
    }

    #[test]
    fn bad_bind_address_is_an_error() {
        assert!(cfg(&[("PLAZA_BIND", "not an addr")]).is_err());
    }
}
