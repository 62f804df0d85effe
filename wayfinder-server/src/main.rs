//! HTTP front end for shortest route queries over a facility store

mod api;
mod config;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wayfinder_core::CsvStore;

use crate::config::{Args, ServerConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig::load(&args)?;
    tracing::debug!(?config, "loaded configuration");

    let store = CsvStore::open(config.data_dir.clone())?;
    let app = api::build_router(AppState::new(store, &config), &config);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        "Serving {} on http://{}",
        config.data_dir.display(),
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
