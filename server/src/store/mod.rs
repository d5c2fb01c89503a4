//! Data store adapter: one cached connection, one todos collection.
//!
//! # Design
//! `Connector` is created once at process start and owns a `OnceCell`, so
//! the first `connect()` opens the backend and every later (or concurrent)
//! call receives a clone of the same `Connection`. The connection is handed
//! to the router as state rather than living in a global.

mod document;
mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::error::StoreError;
use crate::model::{NewTodo, Todo, TodoId};

pub use document::DocumentStore;
pub use mongo::MongoStore;

/// Name of the single collection this service reads and writes.
pub const TODOS_COLLECTION: &str = "todos";

/// A collection of todo documents.
///
/// Each operation touches one document (or reads all of them) and must be
/// atomic per document; handlers take no locks of their own.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// Insert a document and return it with its assigned id.
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError>;

    /// All documents, newest `created_at` first.
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError>;

    /// Set `done` on the matching document. Returns whether one matched.
    async fn set_done(&self, id: TodoId, done: bool) -> Result<bool, StoreError>;

    /// Remove the matching document. Returns whether one was removed.
    async fn delete(&self, id: TodoId) -> Result<bool, StoreError>;
}

pub type TodoCollection = Arc<dyn TodoStore>;

/// An open store handle.
#[derive(Clone)]
pub struct Connection {
    database: String,
    todos: TodoCollection,
}

impl Connection {
    pub fn database(&self) -> &str {
        &self.database
    }

    /// The todos collection. Every call returns the same underlying store.
    pub fn todos(&self) -> TodoCollection {
        Arc::clone(&self.todos)
    }
}

/// Lazily opens and then caches the store connection.
pub struct Connector {
    uri: String,
    database: String,
    connection: OnceCell<Connection>,
}

impl Connector {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            connection: OnceCell::new(),
        }
    }

    pub async fn connect(&self) -> Result<Connection, StoreError> {
        self.connection
            .get_or_try_init(|| async {
                let todos = open(&self.uri, &self.database).await?;
                tracing::info!(
                    database = %self.database,
                    collection = TODOS_COLLECTION,
                    "store connection opened"
                );
                Ok::<_, StoreError>(Connection {
                    database: self.database.clone(),
                    todos,
                })
            })
            .await
            .cloned()
    }
}

/// Open the backend named by a connection string.
///
/// `mongodb://` and `mongodb+srv://` reach a MongoDB deployment;
/// `memory://<name>` keeps documents in process for local runs and tests.
async fn open(uri: &str, database: &str) -> Result<TodoCollection, StoreError> {
    let (scheme, _) = uri
        .split_once("://")
        .ok_or_else(|| StoreError::UnsupportedScheme(uri.to_string()))?;
    match scheme {
        "mongodb" | "mongodb+srv" => Ok(Arc::new(MongoStore::connect(uri, database).await?)),
        "memory" => Ok(Arc::new(DocumentStore::in_memory())),
        _ => Err(StoreError::UnsupportedScheme(scheme.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_is_cached() {
        let connector = Connector::new("memory://todoApp", "todoApp");
        let first = connector.connect().await.unwrap();
        let second = connector.connect().await.unwrap();
        assert!(Arc::ptr_eq(&first.todos(), &second.todos()));
        assert_eq!(first.database(), "todoApp");
    }

    #[tokio::test]
    async fn concurrent_connects_share_one_connection() {
        let connector = Arc::new(Connector::new("memory://todoApp", "todoApp"));
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let connector = Arc::clone(&connector);
                tokio::spawn(async move { connector.connect().await.unwrap().todos() })
            })
            .collect();
        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap());
        }
        assert!(handles.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn collection_reference_is_stable() {
        let connection = Connector::new("memory://todoApp", "todoApp")
            .connect()
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&connection.todos(), &connection.todos()));
    }

    #[tokio::test]
    async fn unknown_scheme_is_rejected() {
        let err = Connector::new("redis://localhost:6379", "todoApp")
            .connect()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::UnsupportedScheme(s) if s == "redis"));
    }

    #[tokio::test]
    async fn uri_without_scheme_is_rejected() {
        let err = Connector::new("todos.json", "todoApp").connect().await.err().unwrap();
        assert!(matches!(err, StoreError::UnsupportedScheme(_)));
    }

    #[tokio::test]
    async fn mongodb_uri_reaches_the_driver() {
        let err = Connector::new("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200", "todoApp")
            .connect()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
