use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::todo::{NewTodo, Todo, TodoFilter, TodoStatus};
use crate::database::store::TodoStore;
use crate::types::{CreateTodoRequest, TodoChanges};

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("todo not found")]
    NotFound,

    #[error("caller does not own this todo")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Operation being served, used to word error responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoAction {
    Create,
    List,
    Update,
    Delete,
}

impl TodoAction {
    pub fn verb(&self) -> &'static str {
        match self {
            TodoAction::Create => "create",
            TodoAction::List => "fetch",
            TodoAction::Update => "update",
            TodoAction::Delete => "delete",
        }
    }

    /// Object phrase for server error messages, e.g. "updating todo"
    pub fn progressive(&self) -> &'static str {
        match self {
            TodoAction::Create => "creating todo",
            TodoAction::List => "fetching todos",
            TodoAction::Update => "updating todo",
            TodoAction::Delete => "deleting todo",
        }
    }
}

/// Ownership-checked CRUD over a `TodoStore`
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, caller: Uuid, input: CreateTodoRequest) -> Result<Todo, TodoError> {
        let title = input
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(TodoError::MissingField("title"))?
            .to_string();

        let todo = self
            .store
            .create(NewTodo {
                title,
                description: input.description,
                owner: caller,
            })
            .await?;

        info!(todo_id = %todo.id, owner = %caller, "Todo created");
        Ok(todo)
    }

    pub async fn list(&self, caller: Uuid, status: Option<TodoStatus>) -> Result<Vec<Todo>, TodoError> {
        let todos = self
            .store
            .find(TodoFilter::owner(caller).with_status(status))
            .await?;

        debug!(owner = %caller, status = ?status, count = todos.len(), "Listed todos");
        Ok(todos)
    }

    pub async fn update(&self, caller: Uuid, todo_id: &str, changes: TodoChanges) -> Result<Todo, TodoError> {
        let todo = self.find_owned(caller, todo_id, TodoAction::Update).await?;
        self.apply_changes(todo, changes).await
    }

    /// Write `changes` onto a todo already returned by `find_owned`
    pub async fn apply_changes(&self, mut todo: Todo, changes: TodoChanges) -> Result<Todo, TodoError> {
        if let Some(title) = changes.title {
            todo.title = title;
        }
        if let Some(description) = changes.description {
            todo.description = description;
        }
        if let Some(status) = changes.status {
            todo.status = status;
        }

        let saved = self.store.save(&todo).await?.ok_or(TodoError::NotFound)?;

        info!(todo_id = %saved.id, status = %saved.status, "Todo updated");
        Ok(saved)
    }

    pub async fn delete(&self, caller: Uuid, todo_id: &str) -> Result<(), TodoError> {
        let todo = self.find_owned(caller, todo_id, TodoAction::Delete).await?;

        if !self.store.delete(todo.id).await? {
            return Err(TodoError::NotFound);
        }

        info!(todo_id = %todo.id, "Todo removed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.store.health_check().await
    }

    /// Existence is checked before ownership, so non-owners see 403 rather than 404.
    pub async fn find_owned(&self, caller: Uuid, todo_id: &str, action: TodoAction) -> Result<Todo, TodoError> {
        // A malformed id cannot name any stored todo
        let id = Uuid::parse_str(todo_id).map_err(|_| TodoError::NotFound)?;

        let todo = self.store.find_by_id(id).await?.ok_or(TodoError::NotFound)?;

        if !todo.is_owned_by(caller) {
            warn!(todo_id = %id, caller = %caller, "Refusing to {} todo owned by another user", action.verb());
            return Err(TodoError::Forbidden);
        }

        Ok(todo)
    }
}
