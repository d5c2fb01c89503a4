//! Client-side state for a todo list view.
//!
//! # Design
//! `TodoBoard` mirrors the server's list and reconciles it with each call's
//! result. Every action moves its key through `Idle -> Busy -> {Applied |
//! RolledBack}`:
//!
//! - `begin_*` validates locally, marks the key busy, and hands back a
//!   ticket describing the one request the host must make;
//! - `finish_*` consumes the ticket plus the call's result, applies it on
//!   success or leaves state untouched on failure, and always clears busy.
//!
//! Nothing is applied optimistically before the call resolves, so a failed
//! action needs no undo. A host that gives up on a call without a result
//! (early return, cancelled future) hands the ticket to `abandon`. A second
//! action on a key that is still busy is refused rather than interleaved.
//! Hosts with a blocking `Transport` can use `load` / `add` / `toggle` /
//! `delete`, which drive both phases.

use std::collections::{HashSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};

use crate::client::TodoApi;
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::{DeletedTodo, Todo, TodoUpdate};

/// What a busy flag is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKey {
    /// The "add a new todo" action.
    New,
    Todo(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Busy,
}

/// How a finished action left the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The server's result was applied.
    Applied,
    /// The call failed; the board is as it was before `begin_*`.
    RolledBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// An action refused before any request was made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("Please enter a task")]
    EmptyTitle,

    #[error("an action on {0:?} is already in flight")]
    Busy(ActionKey),

    #[error("no todo with id {0} on the board")]
    UnknownTodo(String),
}

/// Pending initial fetch.
#[must_use]
#[derive(Debug)]
pub struct LoadTicket(());

/// Pending create; send `title()` to the server.
#[must_use]
#[derive(Debug)]
pub struct AddTicket {
    title: String,
}

impl AddTicket {
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Pending toggle; send `{id(), done()}` to the server.
#[must_use]
#[derive(Debug)]
pub struct ToggleTicket {
    id: String,
    done: bool,
}

impl ToggleTicket {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The value the toggle asks the server to store.
    pub fn done(&self) -> bool {
        self.done
    }
}

/// Pending delete; send `id()` to the server.
#[must_use]
#[derive(Debug)]
pub struct DeleteTicket {
    id: String,
}

impl DeleteTicket {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A pending action handed out by a `begin_*` call.
pub trait Ticket {
    /// The busy key this ticket holds. `None` for the initial load, which
    /// holds the loading flag instead.
    fn key(&self) -> Option<ActionKey>;
}

impl Ticket for LoadTicket {
    fn key(&self) -> Option<ActionKey> {
        None
    }
}

impl Ticket for AddTicket {
    fn key(&self) -> Option<ActionKey> {
        Some(ActionKey::New)
    }
}

impl Ticket for ToggleTicket {
    fn key(&self) -> Option<ActionKey> {
        Some(ActionKey::Todo(self.id.clone()))
    }
}

impl Ticket for DeleteTicket {
    fn key(&self) -> Option<ActionKey> {
        Some(ActionKey::Todo(self.id.clone()))
    }
}

#[derive(Debug, Default)]
pub struct TodoBoard {
    todos: Vec<Todo>,
    draft: String,
    loading: bool,
    busy: HashSet<ActionKey>,
    notices: VecDeque<Notice>,
}

impl TodoBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Todos in server order, newest first.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self, key: &ActionKey) -> Phase {
        if self.busy.contains(key) {
            Phase::Busy
        } else {
            Phase::Idle
        }
    }

    pub fn is_busy(&self, key: &ActionKey) -> bool {
        self.phase(key) == Phase::Busy
    }

    /// Number of todos not yet done.
    pub fn remaining(&self) -> usize {
        self.todos.iter().filter(|t| !t.done).count()
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.loading = true;
        LoadTicket(())
    }

    /// Replace the list with the fetched one. A failed fetch empties the
    /// list; there is no automatic retry.
    pub fn finish_load(&mut self, _ticket: LoadTicket, result: Result<Vec<Todo>, ApiError>) -> Transition {
        self.loading = false;
        match result {
            Ok(todos) => {
                tracing::debug!(count = todos.len(), "todos loaded");
                self.todos = todos;
                Transition::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "fetching todos failed");
                self.todos.clear();
                self.notify(NoticeLevel::Error, "Failed to fetch todos");
                Transition::RolledBack
            }
        }
    }

    /// Start creating a todo from the current draft.
    pub fn begin_add(&mut self) -> Result<AddTicket, BoardError> {
        if self.draft.trim().is_empty() {
            self.notify(NoticeLevel::Error, BoardError::EmptyTitle.to_string());
            return Err(BoardError::EmptyTitle);
        }
        self.acquire(ActionKey::New)?;
        Ok(AddTicket {
            title: self.draft.clone(),
        })
    }

    pub fn finish_add(&mut self, _ticket: AddTicket, result: Result<Todo, ApiError>) -> Transition {
        self.busy.remove(&ActionKey::New);
        match result {
            Ok(todo) => {
                tracing::debug!(id = %todo.id, "todo added");
                self.todos.insert(0, todo);
                self.draft.clear();
                self.notify(NoticeLevel::Success, "Task added successfully");
                Transition::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "adding todo failed");
                self.notify(NoticeLevel::Error, "Failed to add todo");
                Transition::RolledBack
            }
        }
    }

    /// Start flipping `done` on the todo with `id`.
    pub fn begin_toggle(&mut self, id: &str) -> Result<ToggleTicket, BoardError> {
        let current = self
            .find(id)
            .map(|t| t.done)
            .ok_or_else(|| BoardError::UnknownTodo(id.to_string()))?;
        self.acquire(ActionKey::Todo(id.to_string()))?;
        Ok(ToggleTicket {
            id: id.to_string(),
            done: !current,
        })
    }

    pub fn finish_toggle(&mut self, ticket: ToggleTicket, result: Result<TodoUpdate, ApiError>) -> Transition {
        self.busy.remove(&ActionKey::Todo(ticket.id.clone()));
        match result {
            Ok(update) => {
                if let Some(todo) = self.todos.iter_mut().find(|t| t.id == ticket.id) {
                    todo.merge(&update);
                }
                Transition::Applied
            }
            Err(e) => {
                tracing::warn!(id = %ticket.id, error = %e, "updating todo failed");
                self.notify(NoticeLevel::Error, "Failed to update todo");
                Transition::RolledBack
            }
        }
    }

    pub fn begin_delete(&mut self, id: &str) -> Result<DeleteTicket, BoardError> {
        if self.find(id).is_none() {
            return Err(BoardError::UnknownTodo(id.to_string()));
        }
        self.acquire(ActionKey::Todo(id.to_string()))?;
        Ok(DeleteTicket { id: id.to_string() })
    }

    pub fn finish_delete(&mut self, ticket: DeleteTicket, result: Result<DeletedTodo, ApiError>) -> Transition {
        self.busy.remove(&ActionKey::Todo(ticket.id.clone()));
        match result {
            Ok(_) => {
                self.todos.retain(|t| t.id != ticket.id);
                self.notify(NoticeLevel::Success, "Task deleted");
                Transition::Applied
            }
            Err(e) => {
                tracing::warn!(id = %ticket.id, error = %e, "deleting todo failed");
                self.notify(NoticeLevel::Error, "Failed to delete todo");
                Transition::RolledBack
            }
        }
    }

    /// Give up on a pending action without a result. The busy flag (or the
    /// loading flag) is released; todos, draft and notices are untouched.
    pub fn abandon(&mut self, ticket: impl Ticket) {
        match ticket.key() {
            Some(key) => {
                tracing::debug!(?key, "action abandoned");
                self.busy.remove(&key);
            }
            None => self.loading = false,
        }
    }

    pub fn load<T: Transport>(&mut self, api: &TodoApi<T>) -> Transition {
        let ticket = self.begin_load();
        let (ticket, result) = self.settle(ticket, |_| api.list_todos());
        self.finish_load(ticket, result)
    }

    pub fn add<T: Transport>(&mut self, api: &TodoApi<T>) -> Result<Transition, BoardError> {
        let ticket = self.begin_add()?;
        let (ticket, result) = self.settle(ticket, |t| api.add_todo(t.title()));
        Ok(self.finish_add(ticket, result))
    }

    pub fn toggle<T: Transport>(&mut self, api: &TodoApi<T>, id: &str) -> Result<Transition, BoardError> {
        let ticket = self.begin_toggle(id)?;
        let (ticket, result) = self.settle(ticket, |t| api.update_todo(t.id(), t.done()));
        Ok(self.finish_toggle(ticket, result))
    }

    pub fn delete<T: Transport>(&mut self, api: &TodoApi<T>, id: &str) -> Result<Transition, BoardError> {
        let ticket = self.begin_delete(id)?;
        let (ticket, result) = self.settle(ticket, |t| api.delete_todo(t.id()));
        Ok(self.finish_delete(ticket, result))
    }

    /// Run the call for `ticket`. A panicking transport abandons the ticket
    /// before the panic continues, so the key is not left busy.
    fn settle<K: Ticket, R>(&mut self, ticket: K, call: impl FnOnce(&K) -> R) -> (K, R) {
        match panic::catch_unwind(AssertUnwindSafe(|| call(&ticket))) {
            Ok(result) => (ticket, result),
            Err(payload) => {
                self.abandon(ticket);
                panic::resume_unwind(payload)
            }
        }
    }

    fn find(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    fn acquire(&mut self, key: ActionKey) -> Result<(), BoardError> {
        if self.busy.contains(&key) {
            return Err(BoardError::Busy(key));
        }
        self.busy.insert(key);
        Ok(())
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push_back(Notice {
            level,
            message: message.into(),
        });
    }
}
