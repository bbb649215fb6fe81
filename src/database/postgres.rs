use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::todo::{NewTodo, Todo, TodoFilter, TodoStatus};
use crate::database::store::TodoStore;

const TODO_COLUMNS: &str = "id, title, description, status, owner_id, created_at, updated_at";

/// `TodoStore` backed by the `todos` table
#[derive(Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn create(&self, new_todo: NewTodo) -> Result<Todo, DatabaseError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO todos ({TODO_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {TODO_COLUMNS}"
        );

        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(Uuid::now_v7())
            .bind(&new_todo.title)
            .bind(&new_todo.description)
            .bind(TodoStatus::Pending.as_str())
            .bind(new_todo.owner)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(todo)
    }

    async fn find(&self, filter: TodoFilter) -> Result<Vec<Todo>, DatabaseError> {
        // UUID v7 ids are time ordered, so they settle created_at ties in insertion order.
        let todos = match filter.status {
            Some(status) => {
                let sql = format!(
                    "SELECT {TODO_COLUMNS} FROM todos WHERE owner_id = $1 AND status = $2 ORDER BY created_at DESC, id DESC"
                );
                sqlx::query_as::<_, Todo>(&sql)
                    .bind(filter.owner)
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {TODO_COLUMNS} FROM todos WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
                );
                sqlx::query_as::<_, Todo>(&sql)
                    .bind(filter.owner)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(todos)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, DatabaseError> {
        let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1");
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn save(&self, todo: &Todo) -> Result<Option<Todo>, DatabaseError> {
        let sql = format!(
            "UPDATE todos SET title = $2, description = $3, status = $4, updated_at = $5 WHERE id = $1 RETURNING {TODO_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, Todo>(&sql)
            .bind(todo.id)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.status.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
