/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{DateTime, Utc};

/// Tenant and user the current request acts for. Resolved once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope {
    pub tenant_id: u64,
    pub user_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub id: u64,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct TenantMembership {
    pub tenant_id: u64,
    pub tenant_slug: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub display_name: String,
    pub memberships: Vec<TenantMembership>,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: u64,
    pub author_user_id: u64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub liked_by_me: bool,
    pub like_count: u32,
    pub comment_count: u32,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub author_user_id: u64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTarget {
    Post,
    Comment,
}

impl ReactionTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionTarget::Post => "post",
            ReactionTarget::Comment => "comment",
        }
    }
}

/// State of the caller's reaction after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionState {
    pub active: bool,
    pub total: u32,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub member_user_ids: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub conversation_id: u64,
    pub sender_user_id: u64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
