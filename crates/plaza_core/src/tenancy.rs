/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tenants, users and the per-request scope.

use tracing::debug;

use crate::context::CoreContext;
use crate::error::{CoreError, CoreResult};
use crate::model::{Scope, Tenant, User};

const DEFAULT_ROLE: &str = "member";

#[derive(Clone)]
pub struct TenancyService {
    ctx: CoreContext,
}

impl TenancyService {
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// Maps a tenant slug and identity-provider subject to a scope, creating the
    /// user and its membership on first sight.
    pub async fn resolve_scope(&self, tenant_slug: &str, auth_sub: &str) -> CoreResult<Scope> {
        let tenant_slug = tenant_slug.trim().to_string();
        let auth_sub = auth_sub.trim().to_string();
        if tenant_slug.is_empty() || auth_sub.is_empty() {
            return Err(CoreError::Unauthenticated("tenant and user are required".to_string()));
        }

        let scope = self
            .ctx
            .store("resolve_scope", move |db| {
                let Some(tenant) = db.tenant_by_slug(&tenant_slug)? else {
                    return Ok(None);
                };
                let user_id = db.ensure_user(&auth_sub, &auth_sub)?;
                db.ensure_membership(tenant.id, user_id, DEFAULT_ROLE)?;
                Ok(Some(Scope {
                    tenant_id: tenant.id,
                    user_id,
                }))
            })
            .await?;
        let scope = scope.ok_or_else(|| CoreError::NotFound("tenant".to_string()))?;
        debug!(tenant_id = scope.tenant_id, user_id = scope.user_id, "scope resolved");
        Ok(scope)
    }

    /// Tenant serving `host`: a registered domain first, then the first DNS
    /// label taken as the slug.
    pub async fn resolve_tenant(&self, host: &str) -> CoreResult<Tenant> {
        let host = normalize_host(host);
        if host.is_empty() {
            return Err(CoreError::InvalidArgument("host is required".to_string()));
        }
        let tenant = self
            .ctx
            .store("resolve_tenant", move |db| {
                if let Some(t) = db.tenant_by_domain(&host)? {
                    return Ok(Some(t));
                }
                let slug = host.split('.').next().unwrap_or_default();
                db.tenant_by_slug(slug)
            })
            .await?;
        tenant.ok_or_else(|| CoreError::NotFound("tenant".to_string()))
    }

    pub async fn get_me(&self, scope: Scope) -> CoreResult<User> {
        let user = self.ctx.store("get_me", move |db| db.get_user(scope.user_id)).await?;
        user.ok_or_else(|| CoreError::NotFound("user".to_string()))
    }

    pub async fn ensure_tenant(&self, slug: &str, domain: Option<&str>) -> CoreResult<Tenant> {
        let slug = slug.trim().to_string();
        if slug.is_empty() {
            return Err(CoreError::InvalidArgument("tenant slug is required".to_string()));
        }
        let domain = domain.map(normalize_host);
        self.ctx
            .store("ensure_tenant", move |db| db.ensure_tenant(&slug, domain.as_deref()))
            .await
    }
}

/// Lowercased host without surrounding whitespace or port.
fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    };
    host.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_port_and_case_are_dropped() {
        assert_eq!(normalize_host(" Acme.Example.com:8080 "), "acme.example.com");
        assert_eq!(normalize_host("acme"), "acme");
        assert_eq!(normalize_host(""), "");
    }
}
