use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::todo::{NewTodo, Todo, TodoFilter};

/// Persistence contract for todo documents.
///
/// Every method is a single atomic operation against the backing store.
/// A missing document is reported as `None`/`false`, never as an error.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a todo, assigning its id, `pending` status and timestamps
    async fn create(&self, new_todo: NewTodo) -> Result<Todo, DatabaseError>;

    /// All todos matching `filter`, newest `created_at` first
    async fn find(&self, filter: TodoFilter) -> Result<Vec<Todo>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, DatabaseError>;

    /// Persist title, description and status of an existing todo and bump
    /// `updated_at`. Returns `None` if the todo no longer exists.
    async fn save(&self, todo: &Todo) -> Result<Option<Todo>, DatabaseError>;

    /// Returns whether a todo was removed
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
