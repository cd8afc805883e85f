//! Agent route namespace.
//!
//! The agent pipeline itself is under construction; for now the namespace
//! exposes a liveness placeholder so deploys and dashboards have something
//! to probe.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::error;

use super::AppState;
use crate::logging::Level;

/// Payload returned by the agents liveness endpoint.
#[derive(Debug, Serialize)]
pub struct AgentStatus {
    pub response: String,
    pub status_code: u16,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(status))
}

/// `GET /agents/` - report that the agent server is up.
async fn status(State(state): State<AppState>) -> Json<AgentStatus> {
    match state.loggers.get_logger("agents", Level::Info) {
        Ok(log) => log.info("status probe served"),
        Err(err) => error!("agents logger unavailable: {}", err),
    }

    Json(AgentStatus {
        response: "Agent server is online!".to_string(),
        status_code: 200,
    })
}
