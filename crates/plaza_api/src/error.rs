/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use plaza_core::CoreError;
use plaza_protocol::RpcError;

/// RPC failure rendered as `{ "code", "message" }`.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        Self(e)
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn status_for(code: &str) -> StatusCode {
    match code {
        "invalid_argument" => StatusCode::BAD_REQUEST,
        "unauthenticated" => StatusCode::UNAUTHORIZED,
        "permission_denied" => StatusCode::FORBIDDEN,
        "not_found" => StatusCode::NOT_FOUND,
        "resource_exhausted" => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        // Store failures are already logged where they happened.
        let message = if self.0.is_internal() {
            "internal error".to_string()
        } else {
            self.0.to_string()
        };
        let body = RpcError {
            code: code.to_string(),
            message,
        };
        (status_for(code), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_http_status() {
        let cases = [
            (CoreError::MalformedCursor("x".into()), StatusCode::BAD_REQUEST),
            (CoreError::Unauthenticated("x".into()), StatusCode::UNAUTHORIZED),
            (CoreError::PermissionDenied("x".into()), StatusCode::FORBIDDEN),
            (CoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CoreError::ResourceExhausted("x".into()), StatusCode::TOO_MANY_REQUESTS),
            (CoreError::Store(anyhow::anyhow!("disk")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }
}
