//! CRM sync bridge trigger service.
//!
//! Exposes one HTTP endpoint per record type; each trigger runs a full
//! synchronization pass and returns the run summary.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use bridge_destination::{DestinationClient, DestinationConfig};
use bridge_source::{SourceClient, SourceConfig};
use bridge_sync::SyncPipeline;

mod config;
mod error;
mod routes;

use config::ServerConfig;
use routes::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,bridge_sync=debug,bridge_source=debug,bridge_destination=debug")
        }))
        .init();

    // Load configuration
    let server_config = ServerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });
    let source_config = SourceConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });
    let destination_config = DestinationConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    // Build clients and pipeline
    let source = SourceClient::new(source_config).unwrap_or_else(|e| {
        eprintln!("Source client error: {e}");
        std::process::exit(1);
    });
    let destination = DestinationClient::new(destination_config).unwrap_or_else(|e| {
        eprintln!("Destination client error: {e}");
        std::process::exit(1);
    });

    let pipeline = SyncPipeline::builder()
        .source(Arc::new(source))
        .store(Arc::new(destination))
        .settings(server_config.sync.clone())
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Pipeline error: {e}");
            std::process::exit(1);
        });

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    let app = routes::routes(state);

    let listen_addr = server_config.listen_addr;
    tracing::info!(%listen_addr, "sync trigger server listening");

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Bind error: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    });
}
