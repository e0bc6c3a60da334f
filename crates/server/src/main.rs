use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use printdesk_dispatch::Dispatcher;
use printdesk_engine::OrderEngine;
use printdesk_push::{HttpPushGateway, PushGateway};
use printdesk_realtime::BridgeOptions;
use printdesk_server::config::StoreBackend;
use printdesk_server::{AppState, ServerConfig, ServerError, api};
use printdesk_store_memory::MemoryStore;
use printdesk_store_postgres::{PostgresOrderFeed, PostgresStore};

#[derive(Parser)]
#[command(name = "printdesk-server", about = "Printdesk print-order API server")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    let gateway: Arc<dyn PushGateway> = Arc::new(
        HttpPushGateway::new(config.push.clone())
            .map_err(|e| ServerError::Config(format!("push gateway: {e}")))?,
    );

    let bridge_options = BridgeOptions {
        poll_interval: Some(config.poll_interval()),
        ..BridgeOptions::default()
    };

    let state = match config.store.backend {
        StoreBackend::Memory => {
            info!("using in-memory store; state is lost on restart");
            let store = Arc::new(MemoryStore::new());
            let dispatcher = Arc::new(Dispatcher::new(store.clone(), gateway));
            let engine = Arc::new(OrderEngine::new(store.clone(), dispatcher));
            AppState::new(engine, store.clone(), store.clone(), store, bridge_options).await?
        }
        StoreBackend::Postgres => {
            let pg_config = config
                .store
                .postgres
                .clone()
                .ok_or_else(|| ServerError::Config("missing store.postgres".into()))?;
            info!("connecting to PostgreSQL");
            let store = Arc::new(PostgresStore::connect(pg_config).await?);
            let feed = Arc::new(PostgresOrderFeed::start(store.pool(), store.config()).await?);
            let dispatcher = Arc::new(Dispatcher::new(store.clone(), gateway));
            let engine = Arc::new(OrderEngine::new(store.clone(), dispatcher));
            AppState::new(engine, store.clone(), store, feed, bridge_options).await?
        }
    };

    let router = api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!(listen = %config.listen, "printdesk server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("printdesk server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
    }
}
