use anyhow::Context;

use crate::config::{AppConfig, StoreBackend};
use crate::database::manager::DatabaseManager;

pub async fn handle(config: &AppConfig) -> anyhow::Result<()> {
    if config.database.backend == StoreBackend::Memory {
        anyhow::bail!("TODO_STORE=memory has no schema to migrate");
    }

    let pool = DatabaseManager::connect(config)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool).await.context("migration failed")?;
    pool.close().await;

    println!("Todo schema is up to date");
    Ok(())
}
