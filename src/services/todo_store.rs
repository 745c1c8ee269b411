use tokio::sync::Mutex;
use tracing::debug;

use crate::models::{StoreError, TodoItem};

struct TodoList {
    items: Vec<TodoItem>,
    next_id: u64,
}

/// In-memory to-do list shared by every connection.
///
/// One mutex covers both the items and the id counter, so `list`, `add` and
/// `toggle` are atomic with respect to each other. Ids start at 1 and are
/// never handed out twice.
pub struct TodoStore {
    inner: Mutex<TodoList>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TodoList {
                items: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Snapshot of every item in insertion order.
    pub async fn list(&self) -> Vec<TodoItem> {
        self.inner.lock().await.items.clone()
    }

    /// Append a new pending item. The description is taken as is, empty included.
    pub async fn add(&self, description: String) -> TodoItem {
        let mut list = self.inner.lock().await;
        let item = TodoItem {
            id: list.next_id,
            description,
            completed: false,
        };
        list.next_id += 1;
        list.items.push(item.clone());
        debug!("Stored item id={} ({} items)", item.id, list.items.len());
        item
    }

    /// Flip `completed` on the first item with this id.
    pub async fn toggle(&self, id: u64) -> Result<TodoItem, StoreError> {
        let mut list = self.inner.lock().await;
        let item = list
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(StoreError::NotFound)?;
        item.completed = !item.completed;
        Ok(item.clone())
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}
