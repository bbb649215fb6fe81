use std::net::SocketAddr;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::database::manager::DatabaseManager;
use crate::router::{app, AppState};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides API_PORT)")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs, config: &AppConfig) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    let store = DatabaseManager::open_store(config)
        .await
        .context("failed to open todo store")?;
    let jwt = JwtKeys::from_secret(&config.security.jwt_secret)?;
    let router = app(AppState::new(store, jwt), config);

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(
        environment = ?config.environment,
        backend = ?config.database.backend,
        "Todo API listening on http://{}",
        bind_addr
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Todo API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
