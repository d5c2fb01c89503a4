//! Todo documents as stored and served.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned identifier of a todo document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a client-supplied id. Returns `None` when the text is not in the
    /// store's id format.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

/// A validated todo waiting for the store to assign its id.
#[derive(Clone, Debug)]
pub struct NewTodo {
    pub title: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

impl NewTodo {
    /// `title` must already be trimmed and non-empty. The timestamp is kept
    /// to millisecond precision, which is what the document store records.
    pub fn now(title: String) -> Self {
        Self {
            title,
            done: false,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    pub(crate) fn with_id(self, id: TodoId) -> Todo {
        Todo {
            id,
            title: self.title,
            done: self.done,
            created_at: self.created_at,
        }
    }
}

/// Echo returned by a successful toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DoneUpdate {
    pub id: TodoId,
    pub done: bool,
}

/// Echo returned by a successful delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub id: TodoId,
}
