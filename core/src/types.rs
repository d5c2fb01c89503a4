//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the server's schema but are defined independently, so
//! the client never links the server's store or HTTP stack. Ids are opaque
//! strings here; only the server knows their format. Integration tests catch
//! any schema drift between the two crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTodo {
    pub title: String,
}

/// Request payload for toggling a todo; also the server's echo on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoUpdate {
    pub id: String,
    pub done: bool,
}

/// Request payload for deleting a todo; also the server's echo on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedTodo {
    pub id: String,
}

/// The `{success, data, message, error}` wrapper around every reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl Todo {
    /// Apply a toggle echo. Only `done` changes.
    pub fn merge(&mut self, update: &TodoUpdate) {
        if self.id == update.id {
            self.done = update.done;
        }
    }
}
