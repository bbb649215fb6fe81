use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::todo::{NewTodo, Todo, TodoFilter, TodoStatus};
use crate::database::store::TodoStore;

/// Process-local `TodoStore` for development runs and tests.
///
/// Todos are kept in insertion order; listing walks them newest first so
/// equal `created_at` values still come back in reverse creation order.
#[derive(Clone, Default)]
pub struct InMemoryTodoStore {
    todos: Arc<RwLock<Vec<Todo>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.todos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.todos.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), DatabaseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable("in-memory store switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn create(&self, new_todo: NewTodo) -> Result<Todo, DatabaseError> {
        self.check_available()?;

        let now = Utc::now();
        let todo = Todo {
            id: Uuid::now_v7(),
            title: new_todo.title,
            description: new_todo.description,
            status: TodoStatus::Pending,
            owner: new_todo.owner,
            created_at: now,
            updated_at: now,
        };

        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn find(&self, filter: TodoFilter) -> Result<Vec<Todo>, DatabaseError> {
        self.check_available()?;

        let todos = self.todos.read().await;
        let mut found: Vec<Todo> = todos
            .iter()
            .rev()
            .filter(|todo| filter.matches(todo))
            .cloned()
            .collect();
        // Stable sort keeps reverse insertion order for equal timestamps.
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, DatabaseError> {
        self.check_available()?;

        let todos = self.todos.read().await;
        Ok(todos.iter().find(|todo| todo.id == id).cloned())
    }

    async fn save(&self, todo: &Todo) -> Result<Option<Todo>, DatabaseError> {
        self.check_available()?;

        let mut todos = self.todos.write().await;
        let Some(stored) = todos.iter_mut().find(|t| t.id == todo.id) else {
            return Ok(None);
        };

        stored.title = todo.title.clone();
        stored.description = todo.description.clone();
        stored.status = todo.status;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        self.check_available()?;

        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|todo| todo.id != id);
        Ok(todos.len() != before)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.check_available()
    }
}
