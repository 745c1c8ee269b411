use serde::{Deserialize, Serialize};
use std::fmt;

/// A single entry of the shared to-do list.
///
/// Only `TodoStore` holds these; everything else works on clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: u64,
    pub description: String,
    pub completed: bool,
}

impl TodoItem {
    pub fn status(&self) -> TodoStatus {
        if self.completed {
            TodoStatus::Completed
        } else {
            TodoStatus::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TodoStatus {
    Pending,
    Completed,
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoStatus::Pending => write!(f, "Pending"),
            TodoStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// Wire shape of an item: `{"id":..,"description":..,"status":..}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoView {
    pub id: u64,
    pub description: String,
    pub status: TodoStatus,
}

impl From<&TodoItem> for TodoView {
    fn from(item: &TodoItem) -> Self {
        Self {
            id: item.id,
            description: item.description.clone(),
            status: item.status(),
        }
    }
}

impl From<TodoItem> for TodoView {
    fn from(item: TodoItem) -> Self {
        let status = item.status();
        Self {
            id: item.id,
            description: item.description,
            status,
        }
    }
}
