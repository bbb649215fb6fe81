use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use std::fmt;
use uuid::Uuid;

/// Two-valued lifecycle tag on a todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    Pending,
    Completed,
}

impl TodoStatus {
    /// Exact match only; anything else is not a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TodoStatus::Pending),
            "completed" => Some(TodoStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Pending => "pending",
            TodoStatus::Completed => "completed",
        }
    }
}

impl Default for TodoStatus {
    fn default() -> Self {
        TodoStatus::Pending
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner == user_id
    }
}

// Status is stored as TEXT, so decode it by hand rather than through a Postgres enum type.
impl<'r> FromRow<'r, PgRow> for Todo {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let raw_status: String = row.try_get("status")?;
        let status = TodoStatus::parse(&raw_status).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: format!("unknown todo status '{}'", raw_status).into(),
        })?;

        Ok(Todo {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            status,
            owner: row.try_get("owner_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Insert payload; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub owner: Uuid,
}

/// Equality filter used by `TodoStore::find`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoFilter {
    pub owner: Uuid,
    pub status: Option<TodoStatus>,
}

impl TodoFilter {
    pub fn owner(owner: Uuid) -> Self {
        Self { owner, status: None }
    }

    pub fn with_status(mut self, status: Option<TodoStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        todo.owner == self.owner && self.status.map_or(true, |s| todo.status == s)
    }
}
