use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::{AppConfig, StoreBackend};
use crate::database::memory::InMemoryTodoStore;
use crate::database::postgres::PgTodoStore;
use crate::database::store::TodoStore;

/// Errors raised by the data store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS todos (
        id          UUID PRIMARY KEY,
        title       TEXT NOT NULL,
        description TEXT,
        status      TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'completed')),
        owner_id    UUID NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS todos_owner_created_idx ON todos (owner_id, created_at DESC)",
];

/// Builds pools and stores from configuration
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a Postgres pool sized by `database.max_connections`
    pub async fn connect(config: &AppConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .database
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connection_timeout))
            .connect(url)
            .await?;

        info!(
            max_connections = config.database.max_connections,
            "Created database pool"
        );
        Ok(pool)
    }

    /// Create the todos table and its listing index if they are missing
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Todo schema is up to date");
        Ok(())
    }

    /// Build the store selected by `database.backend`
    pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn TodoStore>, DatabaseError> {
        match config.database.backend {
            StoreBackend::Postgres => {
                let pool = Self::connect(config).await?;
                Self::migrate(&pool).await?;
                Ok(Arc::new(PgTodoStore::new(pool)))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory todo store; data is lost on restart");
                Ok(Arc::new(InMemoryTodoStore::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[tokio::test]
    async fn connect_requires_database_url() {
        let config = AppConfig::defaults(Environment::Development);
        let err = DatabaseManager::connect(&config).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ConfigMissing("DATABASE_URL")));
    }

    #[tokio::test]
    async fn memory_backend_opens_without_database() {
        let mut config = AppConfig::defaults(Environment::Development);
        config.database.backend = StoreBackend::Memory;
        let store = DatabaseManager::open_store(&config).await.unwrap();
        assert!(store.health_check().await.is_ok());
    }
}
