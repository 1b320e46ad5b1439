/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Direct-message conversations and their messages.

use tracing::info;

use crate::context::CoreContext;
use crate::error::{CoreError, CoreResult};
use crate::model::{Conversation, Message, Scope};
use crate::pagination::{Direction, Keyset, Page, CONVERSATIONS_PAGE_LIMIT, MESSAGES_PAGE_LIMIT};
use crate::social_db::now_ns;
use crate::timeline::normalize_body;

#[derive(Clone)]
pub struct DmService {
    ctx: CoreContext,
}

impl DmService {
    pub fn new(ctx: CoreContext) -> Self {
        Self { ctx }
    }

    /// The caller's DM with `other_user_id`, who must belong to the same tenant.
    pub async fn get_or_create_dm(&self, scope: Scope, other_user_id: u64) -> CoreResult<u64> {
        validate_pair(scope.user_id, other_user_id)?;
        let is_member = self
            .ctx
            .store("is_tenant_member", move |db| db.is_tenant_member(scope.tenant_id, other_user_id))
            .await?;
        if !is_member {
            return Err(CoreError::NotFound("user".to_string()));
        }
        self.get_or_create_conversation(scope.tenant_id, scope.user_id, other_user_id)
            .await
    }

    /// Find-or-create for an unordered pair. Concurrent calls for the same pair,
    /// in either order, all get the same id and only one row is ever written.
    pub async fn get_or_create_conversation(&self, tenant_id: u64, user_a: u64, user_b: u64) -> CoreResult<u64> {
        validate_pair(user_a, user_b)?;
        let res = self
            .ctx
            .store("get_or_create_dm", move |db| {
                db.get_or_create_dm_at(tenant_id, user_a, user_b, now_ns())
            })
            .await?;
        if res.created {
            self.ctx.metrics.conversation_created();
            info!(tenant_id, conversation_id = res.conversation_id, "dm conversation created");
        }
        if res.recovered_conflict {
            self.ctx.metrics.dm_conflict_recovered();
            info!(tenant_id, conversation_id = res.conversation_id, "dm create lost race, using existing");
        }
        Ok(res.conversation_id)
    }

    pub async fn list_conversations(&self, scope: Scope, cursor: &str) -> CoreResult<Page<Conversation>> {
        let page = Keyset::from_token(Direction::Descending, CONVERSATIONS_PAGE_LIMIT, cursor)?;
        self.ctx
            .store("list_conversations", move |db| {
                db.list_conversations(scope.tenant_id, scope.user_id, &page)
            })
            .await
    }

    pub async fn list_messages(&self, scope: Scope, conversation_id: u64, cursor: &str) -> CoreResult<Page<Message>> {
        let page = Keyset::from_token(Direction::Descending, MESSAGES_PAGE_LIMIT, cursor)?;
        self.require_member(scope, conversation_id).await?;
        self.ctx
            .store("list_messages", move |db| db.list_messages(scope.tenant_id, conversation_id, &page))
            .await
    }

    pub async fn send_message(&self, scope: Scope, conversation_id: u64, body: &str) -> CoreResult<Message> {
        let body = normalize_body(body)?;
        self.require_member(scope, conversation_id).await?;
        self.ctx
            .store("send_message", move |db| {
                db.create_message_at(scope.tenant_id, conversation_id, scope.user_id, &body, now_ns())
            })
            .await
    }

    async fn require_member(&self, scope: Scope, conversation_id: u64) -> CoreResult<()> {
        let ok = self
            .ctx
            .store("is_conversation_member", move |db| {
                db.is_conversation_member(scope.tenant_id, conversation_id, scope.user_id)
            })
            .await?;
        if ok {
            Ok(())
        } else {
            Err(CoreError::PermissionDenied("not a member of this conversation".to_string()))
        }
    }
}

fn validate_pair(user_a: u64, user_b: u64) -> CoreResult<()> {
    if user_a == 0 || user_b == 0 {
        return Err(CoreError::InvalidArgument("user id is required".to_string()));
    }
    if user_a == user_b {
        return Err(CoreError::InvalidArgument("cannot start a conversation with yourself".to_string()));
    }
    Ok(())
}
