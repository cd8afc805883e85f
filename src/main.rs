//! AnalystAI - HTTP Server Entry Point
//!
//! Loads configuration, wires the logger registry, and starts the HTTP
//! server that exposes the agent API.

use std::sync::Arc;

use analyst_ai::api::{self, AppState};
use analyst_ai::config;
use analyst_ai::logging::{Level, LoggerRegistry};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize diagnostics
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analyst_ai=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; the process must not serve with an invalid one
    let settings = config::get_settings()?;
    info!(
        "Loaded configuration: app={} version={}",
        settings.app_name, settings.app_version
    );

    // Application log pipeline
    let loggers = Arc::new(LoggerRegistry::new(settings));
    let server_log = loggers.get_logger("server", Level::Info)?;
    server_log.info(&format!(
        "{} {} starting on {}:{}",
        settings.app_name, settings.app_version, settings.host, settings.port
    ));

    let state = AppState {
        settings: Arc::new(settings.clone()),
        loggers,
    };
    api::serve(state).await
}
