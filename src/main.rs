use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use todo_api::{cli::Cli, config::AppConfig, database::DatabaseManager, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    cli.apply(&mut config);
    tracing::info!("Starting Todo API in {:?} mode", config.environment);

    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to initialize the database")?;
    tracing::info!("Using {} store", db.backend());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, &db).context("failed to build application state")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Todo API listening on http://{}", bind_addr);

    axum::serve(listener, todo_api::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
