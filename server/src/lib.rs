//! HTTP API for a single collection of todos.
//!
//! # Overview
//! Four endpoints under `/api` (`getTodos`, `addTodo`, `updateTodo`,
//! `deleteTodo`) validate their input, perform one store operation each, and
//! reply with a uniform `{success, data, message, error}` envelope.
//!
//! # Design
//! - The store connection is opened once by a `Connector` and injected into
//!   every handler through `AppState`; there is no global handle.
//! - Every failure, including a wrong method, an unknown route, or a handler
//!   panic, is rendered as a failure envelope with a matching status.
//! - DTOs are defined independently from the `todo-core` client crate;
//!   client integration tests catch schema drift.

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
mod middleware;
pub mod model;
pub mod payload;
pub mod store;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use axum::Router;
use tokio::net::TcpListener;

pub use config::ServerConfig;
pub use envelope::Envelope;
pub use error::{ApiError, ConfigError, StoreError};
pub use model::{NewTodo, Todo, TodoId};
pub use store::{Connection, Connector, DocumentStore, TodoCollection, TodoStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub todos: TodoCollection,
    pub allowed_origin: Option<String>,
}

impl AppState {
    pub fn new(todos: TodoCollection, allowed_origin: Option<String>) -> Self {
        Self {
            todos,
            allowed_origin,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/getTodos",
            get(handlers::list_todos).fallback(|| async { ApiError::MethodNotAllowed("GET") }),
        )
        .route(
            "/addTodo",
            post(handlers::add_todo).fallback(|| async { ApiError::MethodNotAllowed("POST") }),
        )
        .route(
            "/updateTodo",
            put(handlers::update_todo).fallback(|| async { ApiError::MethodNotAllowed("PUT") }),
        )
        .route(
            "/deleteTodo",
            delete(handlers::delete_todo)
                .fallback(|| async { ApiError::MethodNotAllowed("DELETE") }),
        );

    Router::new()
        .nest("/api", api)
        .fallback(|| async { ApiError::NotFound("Route not found") })
        .layer(from_fn(middleware::catch_panic))
        .layer(from_fn_with_state(state.clone(), middleware::cors))
        .layer(from_fn(middleware::trace_requests))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}
