//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health - Relay status
//!
//! A WebSocket handshake on either path is upgraded like on any other.

use axum::{
    extract::{ws::rejection::WebSocketUpgradeRejection, ws::WebSocketUpgrade, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;
use crate::websocket::{accept_upgrade, Handshake};

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Response {
    match accept_upgrade(ws, &state, request) {
        Handshake::Answered(response) => response,
        Handshake::Plain(_) => StatusCode::OK.into_response(),
    }
}

/// GET /health
///
/// Connection and relay counters.
pub async fn full_health(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Response {
    match accept_upgrade(ws, &state, request) {
        Handshake::Answered(response) => response,
        Handshake::Plain(_) => Json(health_report(&state).await).into_response(),
    }
}

pub async fn health_report(state: &AppState) -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        connections: state.hub.connection_count().await,
        records_relayed: state.stats.records_relayed(),
        connections_evicted: state.stats.connections_evicted(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::websocket::HubConfig;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_health_report_counts_connections() {
        let state = AppState::standalone(ServerConfig::default(), HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        state.hub.register(tx).await.unwrap();

        let health = health_report(&state).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.connections, 1);
        assert_eq!(health.records_relayed, 0);
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
