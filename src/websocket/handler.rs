//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and manages the connection lifecycle.
//! Any path can be upgraded; requests that do not ask for an upgrade are
//! handed to the static file service.

use axum::{
    extract::{
        ws::{
            close_code, rejection::WebSocketUpgradeRejection, CloseFrame, Message, WebSocket,
            WebSocketUpgrade,
        },
        Request, State,
    },
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::util::ServiceExt;

use super::hub::ConnectionHub;
use crate::api::AppState;

/// Outcome of checking a request for a WebSocket handshake
pub enum Handshake {
    /// Upgraded, or a broken handshake was rejected
    Answered(Response),
    /// No upgrade was asked for; the caller serves the request
    Plain(Request),
}

/// Upgrade gateway
///
/// Installed as the router fallback. Upgrades requests that carry a valid
/// WebSocket handshake, rejects broken handshakes, and serves everything
/// else from the static directory.
pub async fn websocket_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Response {
    match accept_upgrade(ws, &state, request) {
        Handshake::Answered(response) => response,
        Handshake::Plain(request) => match state.static_files.clone().oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        },
    }
}

/// Join the broadcast if the request is a WebSocket handshake
///
/// Every handler on the listener goes through this first, so an upgrade
/// wins on any path.
pub fn accept_upgrade(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    state: &Arc<AppState>,
    request: Request,
) -> Handshake {
    match ws {
        Ok(ws) => {
            tracing::debug!(uri = %request.uri(), "Upgrading request to WebSocket connection");
            let hub = Arc::clone(&state.hub);
            let response = ws
                .on_failed_upgrade(|error| {
                    tracing::warn!(error = %error, "WebSocket upgrade failed");
                })
                .on_upgrade(move |socket| handle_socket(socket, hub));
            Handshake::Answered(response)
        }
        Err(rejection) if wants_upgrade(request.headers()) => {
            tracing::warn!(
                uri = %request.uri(),
                error = %rejection,
                "Rejected WebSocket handshake"
            );
            Handshake::Answered(rejection.into_response())
        }
        Err(_) => Handshake::Plain(request),
    }
}

/// Whether the request asked for a protocol upgrade at all
fn wants_upgrade(headers: &HeaderMap) -> bool {
    headers.contains_key(header::UPGRADE)
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, hub: Arc<ConnectionHub>) {
    let (mut sender, mut receiver) = socket.split();

    // Create channel for sending records to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Register with hub
    let connection_id = match hub.register(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket connection");
            let frame = CloseFrame {
                code: close_code::AGAIN,
                reason: e.to_string().into(),
            };
            let _ = sender.send(Message::Close(Some(frame))).await;
            return;
        }
    };

    let conn_id_for_send = connection_id.clone();

    // Task to forward records from channel to WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text)).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
        let _ = sender.close().await;
    });

    let conn_id_for_recv = connection_id.clone();

    // Task to drain the client side; only closes matter
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&conn_id_for_recv, msg) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    hub.unregister(&connection_id).await;
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
fn handle_ws_message(connection_id: &str, message: Message) -> bool {
    match message {
        Message::Text(text) => {
            tracing::trace!(
                connection_id = %connection_id,
                len = text.len(),
                "Ignoring client text message"
            );
            true
        }
        Message::Binary(_) => true,
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %connection_id, "Client requested close");
            false
        }
    }
}
