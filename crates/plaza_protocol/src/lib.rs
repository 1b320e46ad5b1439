/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! JSON records exchanged on the `sns.v1` RPC surface.
//!
//! Timestamps travel as RFC 3339 strings with nanosecond precision and
//! cursors as opaque tokens; neither is interpreted on this side.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    pub code: String,
    pub message: String,
}

// TenantService

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResolveTenantRequest {
    #[serde(default)]
    pub host: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResolveTenantResponse {
    pub tenant_id: u64,
    pub slug: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GetMeRequest {}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TenantMembership {
    pub tenant_id: u64,
    pub tenant_slug: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GetMeResponse {
    pub user_id: u64,
    pub display_name: String,
    pub memberships: Vec<TenantMembership>,
}

// TimelineService

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub author_user_id: u64,
    pub body: String,
    pub created_at: String,
    #[serde(default)]
    pub liked_by_me: bool,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub comment_count: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub author_user_id: u64,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ListFeedRequest {
    #[serde(default)]
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListFeedResponse {
    pub items: Vec<Post>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Cursor>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreatePostResponse {
    pub post: Post,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsRequest {
    #[serde(default)]
    pub post_id: u64,
    #[serde(default)]
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListCommentsResponse {
    pub items: Vec<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Cursor>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub post_id: u64,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateCommentResponse {
    pub comment: Comment,
}

// ReactionService

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    #[default]
    Unspecified,
    Post,
    Comment,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionRequest {
    #[serde(default)]
    pub target_type: TargetType,
    #[serde(default)]
    pub target_id: u64,
    #[serde(default, rename = "type")]
    pub reaction_type: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToggleReactionResponse {
    pub active: bool,
    pub total: u32,
}

// DMService

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: u64,
    pub created_at: String,
    pub member_user_ids: Vec<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub conversation_id: u64,
    pub sender_user_id: u64,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetOrCreateDmRequest {
    #[serde(default)]
    pub other_user_id: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GetOrCreateDmResponse {
    pub conversation_id: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ListConversationsRequest {
    #[serde(default)]
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListConversationsResponse {
    pub items: Vec<Conversation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Cursor>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesRequest {
    #[serde(default)]
    pub conversation_id: u64,
    #[serde(default)]
    pub cursor: Option<Cursor>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListMessagesResponse {
    pub items: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Cursor>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub conversation_id: u64,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SendMessageResponse {
    pub message: Message,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cursor_deserializes_as_first_page() {
        let req: ListCommentsRequest = serde_json::from_str(r#"{"postId":7}"#).unwrap();
        assert_eq!(req.post_id, 7);
        assert!(req.cursor.is_none());
    }

    #[test]
    fn next_cursor_is_omitted_at_end_of_stream() {
        let resp = ListFeedResponse { items: vec![], next: None };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"items":[]}"#);
    }

    #[test]
    fn target_type_uses_enum_names() {
        let req: ToggleReactionRequest =
            serde_json::from_str(r#"{"targetType":"COMMENT","targetId":3,"type":"like"}"#).unwrap();
        assert_eq!(req.target_type, TargetType::Comment);
        assert_eq!(req.reaction_type, "like");
    }
}
