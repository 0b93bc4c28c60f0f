//! Chat relay server binary.
//!
//! Reads configuration from the environment, builds the configured chat
//! engine and serves the relay until Ctrl-C or SIGTERM.

use std::net::AddrParseError;

use thiserror::Error;
use tracing::info;

use chat_relay::adapters::{app_router, build_engine, ChatAppState};
use chat_relay::application::handlers::StreamChatHandler;
use chat_relay::config::{AppConfig, ConfigError, ValidationError};
use chat_relay::telemetry::{self, TelemetryError};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("Failed to build chat engine: {0}")]
    Engine(#[from] reqwest::Error),

    #[error("Invalid bind address: {0}")]
    Address(#[from] AddrParseError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init(&config.server)?;

    let engine = build_engine(&config.engine)?;
    let info = engine.engine_info();
    info!(engine = %info.name, model = %info.model, "Chat engine ready");

    let handler = StreamChatHandler::new(engine).with_error_policy(config.relay.error_policy());
    let app = app_router(ChatAppState::new(handler), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        chat_path = %config.server.chat_path(),
        environment = ?config.server.environment,
        "Chat relay listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Chat relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received");
}
