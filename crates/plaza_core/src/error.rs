/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use thiserror::Error;

pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("malformed cursor: {0}")]
    MalformedCursor(String),
    #[error("rate limited: {0}")]
    ResourceExhausted(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl CoreError {
    /// Stable RPC code for the error class.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidArgument(_) | CoreError::MalformedCursor(_) => "invalid_argument",
            CoreError::ResourceExhausted(_) => "resource_exhausted",
            CoreError::NotFound(_) => "not_found",
            CoreError::PermissionDenied(_) => "permission_denied",
            CoreError::Unauthenticated(_) => "unauthenticated",
            CoreError::Store(_) => "internal",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, CoreError::Store(_))
    }
}

impl From<tokio::task::JoinError> for CoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        CoreError::Store(anyhow::anyhow!("blocking store task failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_cursor_is_an_invalid_argument() {
        let err = CoreError::MalformedCursor("bad cursor".to_string());
        assert_eq!(err.code(), "invalid_argument");
        assert!(!err.is_internal());
    }

    #[test]
    fn store_errors_are_internal() {
        let err: CoreError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.code(), "internal");
        assert!(err.is_internal());
    }
}
