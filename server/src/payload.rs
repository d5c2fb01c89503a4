use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A request body parsed as untyped JSON.
///
/// Handlers validate fields themselves so that a wrong field type is reported
/// with its own message. An empty body parses as `{}`.
#[derive(Debug)]
pub struct JsonPayload(pub Value);

impl<S: Send + Sync> FromRequest<S> for JsonPayload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::validation("Request body could not be read"))?;
        parse(&bytes).map(JsonPayload)
    }
}

fn parse(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|_| ApiError::validation("Request body must be valid JSON"))
}
