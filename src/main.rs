use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use equipment_api::auth::TokenKeys;
use equipment_api::config::{AppConfig, Args};
use equipment_api::state::AppState;
use equipment_api::storage::{load_inventory, save_inventory, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so flags can come from the environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_args(Args::parse()).context("invalid configuration")?;
    info!("Starting equipment API in {:?} mode", config.environment);

    let inventory = load_inventory(&config.storage).context("failed to load data files")?;
    let storage = Storage::new(inventory);
    let keys = TokenKeys::from_secret(&config.security.jwt_secret).context("invalid token secret")?;
    let routes = equipment_api::build_routes().context("invalid route table")?;
    info!("Registered {} routes", routes.len());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Equipment API listening on http://{}", bind_addr);

    let state = AppState::new(storage.clone(), keys, routes, config.clone());
    axum::serve(listener, equipment_api::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutting down, saving data files");
    if let Err(e) = save_inventory(&storage.read(), &config.storage) {
        error!("Failed to save data files: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
