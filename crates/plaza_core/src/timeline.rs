/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Posts, the tenant feed and comments.

use std::sync::Arc;

use tracing::{info, warn};

use crate::context::CoreContext;
use crate::error::{CoreError, CoreResult};
use crate::model::{Comment, Post, Scope};
use crate::pagination::{Direction, Keyset, Page, COMMENTS_PAGE_LIMIT, FEED_PAGE_LIMIT};
use crate::rate_limit::{limiter_key, RateLimit, RateLimiter};
use crate::social_db::now_ns;

pub const MAX_BODY_CHARS: usize = 2000;

/// Trimmed body; empty or longer than [`MAX_BODY_CHARS`] is rejected.
pub fn normalize_body(body: &str) -> CoreResult<String> {
    let body = body.trim();
    if body.is_empty() {
        return Err(CoreError::InvalidArgument("body is required".to_string()));
    }
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(CoreError::InvalidArgument(format!(
            "body exceeds {MAX_BODY_CHARS} characters"
        )));
    }
    Ok(body.to_string())
}

#[derive(Debug, Clone, Copy)]
pub struct TimelineLimits {
    pub post: RateLimit,
    pub comment: RateLimit,
}

impl Default for TimelineLimits {
    fn default() -> Self {
        Self {
            post: RateLimit::per_minute(10),
            comment: RateLimit::per_minute(20),
        }
    }
}

#[derive(Clone)]
pub struct TimelineService {
    ctx: CoreContext,
    limiter: Arc<RateLimiter>,
    limits: TimelineLimits,
}

impl TimelineService {
    pub fn new(ctx: CoreContext, limiter: Arc<RateLimiter>, limits: TimelineLimits) -> Self {
        Self { ctx, limiter, limits }
    }

    async fn admit(&self, action: &'static str, scope: &Scope, limit: RateLimit) -> CoreResult<()> {
        if self.limiter.allow(&limiter_key(action, scope), limit).await {
            return Ok(());
        }
        self.ctx.metrics.rate_limit_hit();
        warn!(
            action,
            tenant_id = scope.tenant_id,
            user_id = scope.user_id,
            "rate limited"
        );
        Err(CoreError::ResourceExhausted(format!("too many {action} requests")))
    }

    pub async fn create_post(&self, scope: Scope, body: &str) -> CoreResult<Post> {
        let body = normalize_body(body)?;
        self.admit("post", &scope, self.limits.post).await?;
        let post = self
            .ctx
            .store("create_post", move |db| {
                db.create_post_at(scope.tenant_id, scope.user_id, &body, now_ns())
            })
            .await?;
        info!(tenant_id = scope.tenant_id, post_id = post.id, "post created");
        Ok(post)
    }

    pub async fn list_feed(&self, scope: Scope, cursor: &str) -> CoreResult<Page<Post>> {
        let page = Keyset::from_token(Direction::Descending, FEED_PAGE_LIMIT, cursor)?;
        self.ctx
            .store("list_feed", move |db| db.list_feed(scope.tenant_id, scope.user_id, &page))
            .await
    }

    pub async fn create_comment(&self, scope: Scope, post_id: u64, body: &str) -> CoreResult<Comment> {
        let body = normalize_body(body)?;
        if post_id == 0 {
            return Err(CoreError::InvalidArgument("post_id is required".to_string()));
        }
        let exists = self
            .ctx
            .store("post_exists", move |db| db.post_exists(scope.tenant_id, post_id))
            .await?;
        if !exists {
            return Err(CoreError::NotFound("post".to_string()));
        }
        self.admit("comment", &scope, self.limits.comment).await?;
        self.ctx
            .store("create_comment", move |db| {
                db.create_comment_at(scope.tenant_id, post_id, scope.user_id, &body, now_ns())
            })
            .await
    }

    pub async fn list_comments(&self, scope: Scope, post_id: u64, cursor: &str) -> CoreResult<Page<Comment>> {
        let page = Keyset::from_token(Direction::Ascending, COMMENTS_PAGE_LIMIT, cursor)?;
        self.ctx
            .store("list_comments", move |db| db.list_comments(scope.tenant_id, post_id, &page))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_trimmed_and_bounded() {
        assert_eq!(normalize_body("  hi \n").unwrap(), "hi");
        assert!(matches!(normalize_body(" \t\n"), Err(CoreError::InvalidArgument(_))));
        assert!(normalize_body(&"é".repeat(MAX_BODY_CHARS)).is_ok());
        assert!(normalize_body(&"a".repeat(MAX_BODY_CHARS + 1)).is_err());
    }
}
