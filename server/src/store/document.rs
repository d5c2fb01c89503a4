use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TodoStore;
use crate::error::StoreError;
use crate::model::{NewTodo, Todo, TodoId};

/// Document collection held in process memory.
///
/// Every mutation runs under the write lock, so each document change is
/// atomic with respect to other requests. Nothing survives a restart.
#[derive(Default)]
pub struct DocumentStore {
    docs: RwLock<Documents>,
}

#[derive(Default)]
struct Documents {
    by_id: HashMap<TodoId, Slot>,
    next_seq: u64,
}

struct Slot {
    // Insertion order; breaks ties between equal timestamps.
    seq: u64,
    todo: Todo,
}

impl DocumentStore {
    pub fn in_memory() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for DocumentStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let todo = todo.with_id(TodoId::generate());
        let mut docs = self.docs.write().await;
        let seq = docs.next_seq;
        docs.next_seq += 1;
        docs.by_id.insert(
            todo.id,
            Slot {
                seq,
                todo: todo.clone(),
            },
        );
        Ok(todo)
    }

    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        let docs = self.docs.read().await;
        let mut slots: Vec<&Slot> = docs.by_id.values().collect();
        slots.sort_by(|a, b| {
            b.todo
                .created_at
                .cmp(&a.todo.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(slots.into_iter().map(|s| s.todo.clone()).collect())
    }

    async fn set_done(&self, id: TodoId, done: bool) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        match docs.by_id.get_mut(&id) {
            Some(slot) => {
                slot.todo.done = done;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: TodoId) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        Ok(docs.by_id.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(title: &str) -> NewTodo {
        NewTodo::now(title.to_string())
    }

    #[tokio::test]
    async fn find_all_is_newest_first() {
        let store = DocumentStore::in_memory();
        for title in ["A", "B", "C"] {
            store.insert(new_todo(title)).await.unwrap();
        }
        let titles: Vec<String> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["C", "B", "A"]);
    }

    #[tokio::test]
    async fn equal_timestamps_fall_back_to_insertion_order() {
        let store = DocumentStore::in_memory();
        let stamp = chrono::Utc::now();
        for title in ["first", "second"] {
            let mut todo = new_todo(title);
            todo.created_at = stamp;
            store.insert(todo).await.unwrap();
        }
        let listed = store.find_all().await.unwrap();
        assert_eq!(listed[0].title, "second");
        assert_eq!(listed[1].title, "first");
    }

    #[tokio::test]
    async fn set_done_only_touches_done() {
        let store = DocumentStore::in_memory();
        let created = store.insert(new_todo("Walk dog")).await.unwrap();
        assert!(store.set_done(created.id, true).await.unwrap());
        let listed = store.find_all().await.unwrap();
        assert_eq!(listed[0].title, created.title);
        assert_eq!(listed[0].created_at, created.created_at);
        assert!(listed[0].done);
    }

    #[tokio::test]
    async fn missing_ids_report_no_match() {
        let store = DocumentStore::in_memory();
        let id = TodoId::generate();
        assert!(!store.set_done(id, true).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_twice_matches_once() {
        let store = DocumentStore::in_memory();
        let created = store.insert(new_todo("Once")).await.unwrap();
        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
