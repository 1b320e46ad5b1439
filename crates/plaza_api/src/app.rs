/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use plaza_core::Core;
use std::sync::atomic::{AtomicU64, Ordering};
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::rpc;

static REQ_ID: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> String {
    let id = REQ_ID.fetch_add(1, Ordering::Relaxed);
    format!("req-{id}")
}

#[derive(Clone)]
pub struct AppState {
    pub core: Core,
    pub allow_dev_headers: bool,
}

pub fn router(state: AppState, max_body: usize) -> Router {
    Router::new()
        .route("/sns.v1.TenantService/ResolveTenant", post(rpc::resolve_tenant))
        .route("/sns.v1.TenantService/GetMe", post(rpc::get_me))
        .route("/sns.v1.TimelineService/ListFeed", post(rpc::list_feed))
        .route("/sns.v1.TimelineService/CreatePost", post(rpc::create_post))
        .route("/sns.v1.TimelineService/ListComments", post(rpc::list_comments))
        .route("/sns.v1.TimelineService/CreateComment", post(rpc::create_comment))
        .route("/sns.v1.ReactionService/ToggleReaction", post(rpc::toggle_reaction))
        .route("/sns.v1.DMService/GetOrCreateDM", post(rpc::get_or_create_dm))
        .route("/sns.v1.DMService/ListConversations", post(rpc::list_conversations))
        .route("/sns.v1.DMService/ListMessages", post(rpc::list_messages))
        .route("/sns.v1.DMService/SendMessage", post(rpc::send_message))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/_plaza/metrics", get(metrics_json))
        .layer(axum::extract::DefaultBodyLimit::max(max_body))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let request_id = req
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("req");
                let correlation_id = req
                    .headers()
                    .get("x-correlation-id")
                    .and_then(|v| v.to_str().ok());
                info_span!(
                    "http",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                    correlation_id = ?correlation_id
                )
            }),
        )
        .layer(from_fn_with_state(state.clone(), count_requests))
        .layer(from_fn(ensure_request_ids))
        .with_state(state)
}

async fn ensure_request_ids(mut req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let headers = req.headers_mut();
    if headers.get("x-request-id").is_none() {
        let request_id = next_request_id();
        headers.insert(
            "x-request-id",
            HeaderValue::from_str(&request_id).unwrap_or_else(|_| HeaderValue::from_static("req")),
        );
    }
    if headers.get("x-correlation-id").is_none() {
        if let Some(req_id) = headers.get("x-request-id").cloned() {
            headers.insert("x-correlation-id", req_id);
        }
    }
    let request_id = req.headers().get("x-request-id").cloned();
    let mut resp = next.run(req).await;
    if let Some(v) = request_id {
        resp.headers_mut().insert("x-request-id", v);
    }
    resp
}

async fn count_requests(
    State(state): State<AppState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    state.core.metrics().request();
    next.run(req).await
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let db = state.core.ctx.db.clone();
    let ready = tokio::task::spawn_blocking(move || db.health_check())
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false);
    if ready {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "db unavailable").into_response()
    }
}

async fn metrics_json(State(state): State<AppState>) -> impl IntoResponse {
    let mut snap = state.core.metrics().snapshot_json();
    snap["rate_limit_buckets"] = serde_json::json!(state.core.limiter.bucket_count().await);
    Json(snap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use plaza_core::timeline::TimelineLimits;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    struct Harness {
        _dir: tempfile::TempDir,
        app: Router,
    }

    async fn harness(allow_dev_headers: bool) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let core = Core::open(
            dir.path().join("plaza.sqlite"),
            Duration::from_secs(5),
            TimelineLimits::default(),
        )
        .unwrap();
        core.tenancy.ensure_tenant("acme", Some("acme.example.com")).await.unwrap();
        let app = router(
            AppState {
                core,
                allow_dev_headers,
            },
            64 * 1024,
        );
        Harness { _dir: dir, app }
    }

    async fn call(app: &Router, path: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json");
        if let Some(user) = user {
            req = req.header("x-tenant", "acme").header("x-user", user);
        }
        let resp = app
            .clone()
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn resolve_tenant_is_public() {
        let h = harness(true).await;
        let (status, body) = call(
            &h.app,
            "/sns.v1.TenantService/ResolveTenant",
            None,
            json!({"host": "acme.example.com"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slug"], "acme");
    }

    #[tokio::test]
    async fn scoped_calls_need_headers() {
        let h = harness(true).await;
        let (status, body) = call(&h.app, "/sns.v1.TimelineService/ListFeed", None, json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthenticated");

        let h = harness(false).await;
        let (status, _) = call(&h.app, "/sns.v1.TimelineService/ListFeed", Some("alice"), json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn post_then_read_feed() {
        let h = harness(true).await;
        let (status, body) = call(
            &h.app,
            "/sns.v1.TimelineService/CreatePost",
            Some("alice"),
            json!({"body": "  hello plaza  "}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["post"]["body"], "hello plaza");

        let (status, body) = call(&h.app, "/sns.v1.TimelineService/ListFeed", Some("bob"), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["items"][0]["likeCount"], 0);
        assert!(body.get("next").is_none());
    }

    #[tokio::test]
    async fn malformed_cursor_is_a_bad_request() {
        let h = harness(true).await;
        let (status, body) = call(
            &h.app,
            "/sns.v1.TimelineService/ListFeed",
            Some("alice"),
            json!({"cursor": {"token": "not-base64!"}}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");
    }

    #[tokio::test]
    async fn post_burst_hits_the_rate_limit() {
        let h = harness(true).await;
        for i in 0..10 {
            let (status, _) = call(
                &h.app,
                "/sns.v1.TimelineService/CreatePost",
                Some("alice"),
                json!({"body": format!("p{i}")}),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = call(
            &h.app,
            "/sns.v1.TimelineService/CreatePost",
            Some("alice"),
            json!({"body": "too many"}),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["code"], "resource_exhausted");
    }

    #[tokio::test]
    async fn dm_round_trip_over_http() {
        let h = harness(true).await;
        let (_, bob) = call(&h.app, "/sns.v1.TenantService/GetMe", Some("bob"), json!({})).await;
        let bob_id = bob["userId"].as_u64().unwrap();

        let (status, dm) = call(
            &h.app,
            "/sns.v1.DMService/GetOrCreateDM",
            Some("alice"),
            json!({"otherUserId": bob_id}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let conv = dm["conversationId"].as_u64().unwrap();

        let (status, _) = call(
            &h.app,
            "/sns.v1.DMService/SendMessage",
            Some("alice"),
            json!({"conversationId": conv, "body": "hi"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, page) = call(
            &h.app,
            "/sns.v1.DMService/ListMessages",
            Some("bob"),
            json!({"conversationId": conv}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["items"][0]["body"], "hi");

        let (status, body) = call(
            &h.app,
            "/sns.v1.DMService/ListMessages",
            Some("mallory"),
            json!({"conversationId": conv}),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "permission_denied");

        let (status, _) = call(
            &h.app,
            "/sns.v1.DMService/GetOrCreateDM",
            Some("bob"),
            json!({"otherUserId": bob_id}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn toggle_reaction_requires_target_type() {
        let h = harness(true).await;
        let (status, _) = call(
            &h.app,
            "/sns.v1.ReactionService/ToggleReaction",
            Some("alice"),
            json!({"targetId": 1}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn request_id_is_echoed_and_metrics_count_requests() {
        let h = harness(true).await;
        let resp = h
            .app
            .clone()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("x-request-id").is_some());

        let resp = h
            .app
            .clone()
            .oneshot(Request::builder().uri("/_plaza/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let snap: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snap["requests"], 2);
    }
}
