//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` (e.g. `http://localhost:3000/api`)
//! and carries no mutable state between calls. Each operation is split into
//! a `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. Every `parse_*` unwraps the server's
//! envelope: a failure envelope is always an `Err`, never a silent empty
//! value.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, ErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::types::{AddTodo, DeletedTodo, Envelope, Todo, TodoUpdate};

/// Message used when a failure envelope carries no `error` text.
pub const DEFAULT_FAILURE: &str = "Operation failed";

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/getTodos", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_add_todo(&self, title: &str) -> Result<HttpRequest, ApiError> {
        let input = AddTodo {
            title: title.to_string(),
        };
        self.json_request(HttpMethod::Post, "addTodo", &input)
    }

    pub fn build_update_todo(&self, id: &str, done: bool) -> Result<HttpRequest, ApiError> {
        let input = TodoUpdate {
            id: id.to_string(),
            done,
        };
        self.json_request(HttpMethod::Put, "updateTodo", &input)
    }

    pub fn build_delete_todo(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let input = DeletedTodo { id: id.to_string() };
        self.json_request(HttpMethod::Delete, "deleteTodo", &input)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_add_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<TodoUpdate, ApiError> {
        unwrap_envelope(response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<DeletedTodo, ApiError> {
        unwrap_envelope(response)
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: format!("{}/{endpoint}", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

/// Decode the envelope and turn `success: false` into `ApiError::Rejected`.
///
/// A body that is not an envelope is a decode error, except on error statuses
/// (e.g. a proxy's HTML 502 page), which are reported as rejections with the
/// default message.
fn unwrap_envelope<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    let kind = ErrorKind::from_status(response.status);
    let envelope: Envelope<T> = match serde_json::from_str(&response.body) {
        Ok(envelope) => envelope,
        Err(_) if response.status >= 400 => {
            return Err(ApiError::Rejected {
                kind,
                message: DEFAULT_FAILURE.to_string(),
            })
        }
        Err(e) => return Err(ApiError::DeserializationError(e.to_string())),
    };
    if !envelope.success {
        return Err(ApiError::Rejected {
            kind,
            message: envelope.error.unwrap_or_else(|| DEFAULT_FAILURE.to_string()),
        });
    }
    envelope
        .data
        .ok_or_else(|| ApiError::DeserializationError("success envelope carries no data".to_string()))
}

/// A `TodoClient` bound to a `Transport`: each operation is one call.
#[derive(Debug, Clone)]
pub struct TodoApi<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> TodoApi<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn list_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let request = self.client.build_list_todos();
        self.client.parse_list_todos(self.transport.execute(request)?)
    }

    pub fn add_todo(&self, title: &str) -> Result<Todo, ApiError> {
        let request = self.client.build_add_todo(title)?;
        self.client.parse_add_todo(self.transport.execute(request)?)
    }

    pub fn update_todo(&self, id: &str, done: bool) -> Result<TodoUpdate, ApiError> {
        let request = self.client.build_update_todo(id, done)?;
        self.client.parse_update_todo(self.transport.execute(request)?)
    }

    pub fn delete_todo(&self, id: &str) -> Result<DeletedTodo, ApiError> {
        let request = self.client.build_delete_todo(id)?;
        self.client.parse_delete_todo(self.transport.execute(request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000/api")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/getTodos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_add_todo_produces_correct_request() {
        let req = client().build_add_todo("Buy milk").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/addTodo");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"title": "Buy milk"}));
    }

    #[test]
    fn build_update_todo_carries_id_and_done() {
        let req = client().build_update_todo("abc", true).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/api/updateTodo");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"id": "abc", "done": true}));
    }

    #[test]
    fn build_delete_todo_sends_id_in_body() {
        let req = client().build_delete_todo("abc").unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/api/deleteTodo");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"id": "abc"}));
    }

    #[test]
    fn parse_list_todos_success() {
        let todos = client()
            .parse_list_todos(response(
                200,
                r#"{"success":true,"data":[{"id":"1","title":"Test","done":false,"createdAt":"2024-05-01T10:00:00Z"}],"message":"Todos retrieved successfully"}"#,
            ))
            .unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Test");
    }

    #[test]
    fn failure_envelope_raises_its_error_text() {
        let err = client()
            .parse_add_todo(response(400, r#"{"success":false,"error":"X"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "X");
        assert_eq!(err.kind(), Some(ErrorKind::Validation));
    }

    #[test]
    fn failure_envelope_without_text_uses_default() {
        let err = client()
            .parse_delete_todo(response(500, r#"{"success":false}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), DEFAULT_FAILURE);
    }

    #[test]
    fn failure_wins_even_on_200() {
        let err = client()
            .parse_list_todos(response(200, r#"{"success":false,"error":"odd"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected { ref message, .. } if message == "odd"));
    }

    #[test]
    fn parse_update_todo_returns_echo() {
        let echo = client()
            .parse_update_todo(response(
                200,
                r#"{"success":true,"data":{"id":"a","done":true},"message":"Todo updated successfully"}"#,
            ))
            .unwrap();
        assert_eq!(echo, TodoUpdate { id: "a".into(), done: true });
    }

    #[test]
    fn not_found_kind_is_preserved() {
        let err = client()
            .parse_update_todo(response(404, r#"{"success":false,"error":"Todo not found"}"#))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn success_without_data_is_an_error() {
        let err = client()
            .parse_delete_todo(response(200, r#"{"success":true}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn non_envelope_error_page_is_rejection() {
        let err = client()
            .parse_list_todos(response(502, "<html>bad gateway</html>"))
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Server));
        assert_eq!(err.to_string(), DEFAULT_FAILURE);
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client().parse_list_todos(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = TodoClient::new("http://localhost:3000/api/").build_list_todos();
        assert_eq!(req.path, "http://localhost:3000/api/getTodos");
    }

    #[test]
    fn api_runs_build_and_parse_through_transport() {
        let transport = |req: HttpRequest| -> Result<HttpResponse, ApiError> {
            assert_eq!(req.method, HttpMethod::Delete);
            Ok(response(200, r#"{"success":true,"data":{"id":"z"}}"#))
        };
        let api = TodoApi::new(client(), transport);
        assert_eq!(api.delete_todo("z").unwrap(), DeletedTodo { id: "z".into() });
    }

    #[test]
    fn api_propagates_transport_failure() {
        let transport = |_: HttpRequest| -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("connection refused".into()))
        };
        let api = TodoApi::new(client(), transport);
        assert!(matches!(api.list_todos(), Err(ApiError::Transport(_))));
    }
}
