mod app;
mod backend;
mod cli;
mod error;
mod handlers;
mod model;
mod state;
mod telemetry;

use crate::app::App;
use crate::cli::CLI;
use crate::state::AppState;
use anyhow::Context;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    telemetry::init(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        cache_ttl_secs = config.cache_ttl_secs,
        "starting kurz gateway"
    );

    let resolver = backend::build_resolver(&config).await?;
    let router = App::router(AppState::new(resolver, config.public_base_url.clone()));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server failed")?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
