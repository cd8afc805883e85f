//! HTTP API surface.
//!
//! Routes are grouped per namespace; `/agents` hosts the agent endpoints.
//! The server itself is thin glue: state in, router out, serve until the
//! process exits.

pub mod agents;

use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Settings;
use crate::logging::LoggerRegistry;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub loggers: Arc<LoggerRegistry>,
}

/// Assemble the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/agents", agents::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve the API until the process exits.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.settings.host, state.settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
