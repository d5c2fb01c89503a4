//! Error taxonomy of the HTTP layer and the data layer.
//!
//! # Design
//! `ApiError` has one variant per reply kind and renders itself as a failure
//! envelope with the matching status, so handlers can return it with `?`.
//! Storage failures are logged here with their cause and then reduced to a
//! fixed per-operation message; clients never see store internals.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::envelope::Envelope;

/// Failure reported to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(&'static str),

    /// The path exists but is bound to a different method.
    #[error("Method not allowed. Use {0}.")]
    MethodNotAllowed(&'static str),

    /// The store failed while serving the request.
    #[error("{0}")]
    Storage(&'static str),

    /// A handler panicked or otherwise failed unexpectedly.
    #[error("Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Log the store failure and reduce it to `message`.
    pub fn storage(message: &'static str, source: StoreError) -> Self {
        tracing::error!(error = %source, "{message}");
        Self::Storage(message)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Storage(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(Envelope::failure(self.to_string()))).into_response()
    }
}

/// Failure inside a `TodoStore` backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("stored document is malformed: {0}")]
    Corrupt(String),

    #[error("unsupported connection string scheme: {0}")]
    UnsupportedScheme(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Missing or invalid process configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not defined")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MethodNotAllowed("GET").status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ApiError::Storage("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn method_not_allowed_names_expected_method() {
        assert_eq!(
            ApiError::MethodNotAllowed("DELETE").to_string(),
            "Method not allowed. Use DELETE."
        );
    }

    #[test]
    fn storage_hides_source() {
        let err = ApiError::storage("Failed to fetch todos", StoreError::Backend("disk on fire".into()));
        assert_eq!(err.to_string(), "Failed to fetch todos");
    }
}
