/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! `sns.v1` handlers: decode the JSON request, resolve the caller, call the
//! core service, encode the response.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use plaza_core::model::{self, ReactionTarget};
use plaza_core::pagination::Page;
use plaza_core::{CoreError, Scope};
use plaza_protocol as proto;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ApiError(CoreError::InvalidArgument(format!("bad request body: {}", e.body_text()))))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
}

/// Caller identity from the development `X-Tenant` / `X-User` headers.
async fn scope(state: &AppState, headers: &HeaderMap) -> Result<Scope, ApiError> {
    if !state.allow_dev_headers {
        return Err(CoreError::Unauthenticated("dev headers disabled".to_string()).into());
    }
    let tenant = header(headers, "x-tenant");
    let user = header(headers, "x-user");
    match state.core.tenancy.resolve_scope(tenant, user).await {
        Ok(scope) => Ok(scope),
        Err(CoreError::NotFound(_)) => Err(CoreError::Unauthenticated("unknown tenant".to_string()).into()),
        Err(e) => Err(e.into()),
    }
}

fn token(cursor: &Option<proto::Cursor>) -> &str {
    cursor.as_ref().map(|c| c.token.as_str()).unwrap_or("")
}

fn next_cursor<T>(page: &Page<T>) -> Option<proto::Cursor> {
    page.next.map(|c| proto::Cursor { token: c.encode() })
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn post_dto(p: model::Post) -> proto::Post {
    proto::Post {
        id: p.id,
        author_user_id: p.author_user_id,
        body: p.body,
        created_at: timestamp(p.created_at),
        liked_by_me: p.liked_by_me,
        like_count: p.like_count,
        comment_count: p.comment_count,
    }
}

fn comment_dto(c: model::Comment) -> proto::Comment {
    proto::Comment {
        id: c.id,
        post_id: c.post_id,
        author_user_id: c.author_user_id,
        body: c.body,
        created_at: timestamp(c.created_at),
    }
}

fn conversation_dto(c: model::Conversation) -> proto::Conversation {
    proto::Conversation {
        id: c.id,
        created_at: timestamp(c.created_at),
        member_user_ids: c.member_user_ids,
    }
}

fn message_dto(m: model::Message) -> proto::Message {
    proto::Message {
        id: m.id,
        conversation_id: m.conversation_id,
        sender_user_id: m.sender_user_id,
        body: m.body,
        created_at: timestamp(m.created_at),
    }
}

// TenantService

pub async fn resolve_tenant(
    State(state): State<AppState>,
    payload: Result<Json<proto::ResolveTenantRequest>, JsonRejection>,
) -> ApiResult<proto::ResolveTenantResponse> {
    let req = body(payload)?;
    let tenant = state.core.tenancy.resolve_tenant(&req.host).await?;
    Ok(Json(proto::ResolveTenantResponse {
        tenant_id: tenant.id,
        slug: tenant.slug,
    }))
}

pub async fn get_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<proto::GetMeRequest>, JsonRejection>,
) -> ApiResult<proto::GetMeResponse> {
    body(payload)?;
    let scope = scope(&state, &headers).await?;
    let user = state.core.tenancy.get_me(scope).await?;
    Ok(Json(proto::GetMeResponse {
        user_id: user.id,
        display_name: user.display_name,
        memberships: user
            .memberships
            .into_iter()
            .map(|m| proto::TenantMembership {
                tenant_id: m.tenant_id,
                tenant_slug: m.tenant_slug,
                role: m.role,
            })
            .collect(),
    }))
}

// TimelineService

pub async fn list_feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<proto::ListFeedRequest>, JsonRejection>,
) -> ApiResult<proto::ListFeedResponse> {
    let req = body(payload)?;
    let scope = scope(&state, &headers).await?;
    let page = state.core.timeline.list_feed(scope, token(&req.cursor)).await?;
    let next = next_cursor(&page);
    Ok(Json(proto::ListFeedResponse {
        items: page.items.into_iter().map(post_dto).collect(),
        next,
    }))
}

pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<proto::CreatePostRequest>, JsonRejection>,
) -> ApiResult<proto::CreatePostResponse> {
    let req = body(payload)?;
    let scope = scope(&state, &headers).await?;
    let post = state.core.timeline.create_post(scope, &req.body).await?;
    Ok(Json(proto::CreatePostResponse { post: post_dto(post) }))
}

pub async fn list_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<proto::ListCommentsRequest>, JsonRejection>,
) -> ApiResult<proto::ListCommentsResponse> {
    let req = body(payload)?;
    let scope = scope(&state, &headers).await?;
    let page = state
        .core
        .timeline
        .list_comments(scope, req.post_id, token(&req.cursor))
        .await?;
    let next = next_cursor(&page);
    Ok(Json(proto::ListCommentsResponse {
        items: page.items.into_iter().map(comment_dto).collect(),
        next,
    }))
}

pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<proto::CreateCommentRequest>, JsonRejection>,
) -> ApiResult<proto::CreateCommentResponse> {
    let req = body(payload)?;
    let scope = scope(&state, &headers).await?;
    let comment = state
        .core
        .timeline
        .create_comment(scope, req.post_id, &req.body)
        .await?;
    Ok(Json(proto::CreateCommentResponse {
        comment: comment_dto(comment),
    }))
}

// ReactionService

pub async fn toggle_reaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<proto::ToggleReactionRequest>, JsonRejection>,
) -> ApiResult<proto::ToggleReactionResponse> {
    let req = body(payload)?;
    let scope = scope(&state, &headers).await?;
    let target = match req.target_type {
        proto::TargetType::Post => ReactionTarget::Post,
        proto::TargetType::Comment => ReactionTarget::Comment,
        proto::TargetType::Unspecified => {
            return Err(CoreError::InvalidArgument("target_type is required".to_string()).into())
        }
    };
    let state = state
        .core
        .reactions
        .toggle_reaction(scope, target, req.target_id, &req.reaction_type)
        .await?;
    Ok(Json(proto::ToggleReactionResponse {
        active: state.active,
        total: state.total,
    }))
}

// DMService

pub async fn get_or_create_dm(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<proto::GetOrCreateDmRequest>, JsonRejection>,
) -> ApiResult<proto::GetOrCreateDmResponse> {
    let req = body(payload)?;
    let scope = scope(&state, &headers).await?;
    let conversation_id = state.core.dm.get_or_create_dm(scope, req.other_user_id).await?;
    Ok(Json(proto::GetOrCreateDmResponse { conversation_id }))
}

pub async fn list_conversations(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<proto::ListConversationsRequest>, JsonRejection>,
) -> ApiResult<proto::ListConversationsResponse> {
    let req = body(payload)?;
    let scope = scope(&state, &headers).await?;
    let page = state.core.dm.list_conversations(scope, token(&req.cursor)).await?;
    let next = next_cursor(&page);
    Ok(Json(proto::ListConversationsResponse {
        items: page.items.into_iter().map(conversation_dto).collect(),
        next,
    }))
}

pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<proto::ListMessagesRequest>, JsonRejection>,
) -> ApiResult<proto::ListMessagesResponse> {
    let req = body(payload)?;
    let scope = scope(&state, &headers).await?;
    let page = state
        .core
        .dm
        .list_messages(scope, req.conversation_id, token(&req.cursor))
        .await?;
    let next = next_cursor(&page);
    Ok(Json(proto::ListMessagesResponse {
        items: page.items.into_iter().map(message_dto).collect(),
        next,
    }))
}

pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<proto::SendMessageRequest>, JsonRejection>,
) -> ApiResult<proto::SendMessageResponse> {
    let req = body(payload)?;
    let scope = scope(&state, &headers).await?;
    let message = state
        .core
        .dm
        .send_message(scope, req.conversation_id, &req.body)
        .await?;
    Ok(Json(proto::SendMessageResponse {
        message: message_dto(message),
    }))
}
