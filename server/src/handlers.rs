//! The four todo endpoints.
//!
//! Each handler validates its input, performs exactly one store operation,
//! and maps the outcome to an envelope. Validation failures never reach the
//! store.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::model::{Deleted, DoneUpdate, NewTodo, Todo, TodoId};
use crate::payload::JsonPayload;
use crate::AppState;

const TITLE_REQUIRED: &str = "Title is required and must be a non-empty string";
const ID_REQUIRED: &str = "Todo ID is required";
const ID_INVALID: &str = "Invalid todo ID format";
const DONE_NOT_BOOLEAN: &str = "Done must be a boolean value";
const TODO_NOT_FOUND: &str = "Todo not found";

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Envelope<Vec<Todo>>>, ApiError> {
    let todos = state
        .todos
        .find_all()
        .await
        .map_err(|e| ApiError::storage("Failed to fetch todos", e))?;
    Ok(Json(Envelope::ok(todos, "Todos retrieved successfully")))
}

pub async fn add_todo(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> Result<(StatusCode, Json<Envelope<Todo>>), ApiError> {
    let title = required_title(&body)?;
    let todo = state
        .todos
        .insert(NewTodo::now(title))
        .await
        .map_err(|e| ApiError::storage("Failed to create todo", e))?;
    tracing::info!(id = %todo.id, "todo created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(todo, "Todo created successfully")),
    ))
}

pub async fn update_todo(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> Result<Json<Envelope<DoneUpdate>>, ApiError> {
    let raw_id = required_id(&body)?;
    let done = body
        .get("done")
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::validation(DONE_NOT_BOOLEAN))?;
    let id = parse_id(raw_id)?;

    let matched = state
        .todos
        .set_done(id, done)
        .await
        .map_err(|e| ApiError::storage("Failed to update todo", e))?;
    if !matched {
        return Err(ApiError::NotFound(TODO_NOT_FOUND));
    }
    tracing::info!(%id, done, "todo updated");
    Ok(Json(Envelope::ok(
        DoneUpdate { id, done },
        "Todo updated successfully",
    )))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    JsonPayload(body): JsonPayload,
) -> Result<Json<Envelope<Deleted>>, ApiError> {
    let id = parse_id(required_id(&body)?)?;

    let removed = state
        .todos
        .delete(id)
        .await
        .map_err(|e| ApiError::storage("Failed to delete todo", e))?;
    if !removed {
        return Err(ApiError::NotFound(TODO_NOT_FOUND));
    }
    tracing::info!(%id, "todo deleted");
    Ok(Json(Envelope::ok(Deleted { id }, "Todo deleted successfully")))
}

/// The trimmed title, if the body carries a non-blank string title.
fn required_title(body: &Value) -> Result<String, ApiError> {
    match body.get("title").and_then(Value::as_str).map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title.to_string()),
        _ => Err(ApiError::validation(TITLE_REQUIRED)),
    }
}

/// The raw `id` field. Absent, null, `false`, `0` and `""` all count as
/// missing.
fn required_id(body: &Value) -> Result<&Value, ApiError> {
    match body.get("id") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Err(ApiError::validation(ID_REQUIRED)),
        Some(Value::String(s)) if s.is_empty() => Err(ApiError::validation(ID_REQUIRED)),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(ApiError::validation(ID_REQUIRED)),
        Some(id) => Ok(id),
    }
}

fn parse_id(raw: &Value) -> Result<TodoId, ApiError> {
    raw.as_str()
        .and_then(TodoId::parse)
        .ok_or_else(|| ApiError::validation(ID_INVALID))
}
