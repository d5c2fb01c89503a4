//! Error types for the todo API client.
//!
//! # Design
//! A failure envelope becomes `Rejected`, whose `Display` is exactly the
//! server's `error` text so it can be shown to users unchanged. The `kind`
//! is derived from the HTTP status for callers that need to branch, e.g. to
//! tell "no such todo" apart from "bad input".

/// Category of a server-side rejection, derived from the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 400
    Validation,
    /// 404
    NotFound,
    /// 405
    MethodNotAllowed,
    /// 5xx
    Server,
    Other,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::Validation,
            404 => ErrorKind::NotFound,
            405 => ErrorKind::MethodNotAllowed,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Other,
        }
    }
}

/// Errors returned by `TodoClient` parse methods and transports.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with `success: false`.
    #[error("{message}")]
    Rejected { kind: ErrorKind, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The HTTP round-trip itself failed.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Rejected { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
