//! Synchronous API client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, either by hand or through a `Transport`, which
//! keeps the core deterministic and testable.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Every reply is an envelope; a failure envelope always surfaces as
//!   `ApiError::Rejected` carrying the server's message.
//! - `TodoBoard` is the view state on top: list, draft, per-action busy
//!   flags and notices.
//! - DTOs are defined independently from the server crate; integration
//!   tests catch schema drift.

pub mod board;
pub mod client;
pub mod error;
pub mod http;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use board::{
    ActionKey, AddTicket, BoardError, DeleteTicket, LoadTicket, Notice, NoticeLevel, Phase,
    Ticket, ToggleTicket, TodoBoard, Transition,
};
pub use client::{TodoApi, TodoClient, DEFAULT_FAILURE};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{AddTodo, DeletedTodo, Todo, TodoUpdate};
