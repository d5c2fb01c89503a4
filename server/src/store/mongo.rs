use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use super::{TodoStore, TODOS_COLLECTION};
use crate::error::StoreError;
use crate::model::{NewTodo, Todo, TodoId};

/// The todos collection of a MongoDB database.
///
/// Documents keep the todo id as a string `_id` and `createdAt` as a BSON
/// date, so the server-side sort on `createdAt` is chronological.
pub struct MongoStore {
    todos: Collection<TodoDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    done: bool,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl From<&Todo> for TodoDocument {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id.to_string(),
            title: todo.title.clone(),
            done: todo.done,
            created_at: todo.created_at,
        }
    }
}

impl TryFrom<TodoDocument> for Todo {
    type Error = StoreError;

    fn try_from(doc: TodoDocument) -> Result<Self, Self::Error> {
        let id = TodoId::parse(&doc.id)
            .ok_or_else(|| StoreError::Corrupt(format!("document _id {:?} is not a todo id", doc.id)))?;
        Ok(Todo {
            id,
            title: doc.title,
            done: doc.done,
            created_at: doc.created_at,
        })
    }
}

impl MongoStore {
    /// Connect to `uri` and ping `database` so a bad address fails at startup
    /// rather than on the first request.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;
        Ok(Self {
            todos: db.collection(TODOS_COLLECTION),
        })
    }
}

#[async_trait]
impl TodoStore for MongoStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let todo = todo.with_id(TodoId::generate());
        self.todos.insert_one(TodoDocument::from(&todo)).await?;
        Ok(todo)
    }

    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        let docs: Vec<TodoDocument> = self
            .todos
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?
            .try_collect()
            .await?;
        docs.into_iter().map(Todo::try_from).collect()
    }

    async fn set_done(&self, id: TodoId, done: bool) -> Result<bool, StoreError> {
        let result = self
            .todos
            .update_one(doc! { "_id": id.to_string() }, doc! { "$set": { "done": done } })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: TodoId) -> Result<bool, StoreError> {
        let result = self.todos.delete_one(doc! { "_id": id.to_string() }).await?;
        Ok(result.deleted_count > 0)
    }
}
