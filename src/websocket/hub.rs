//! WebSocket Connection Hub
//!
//! Tracks every live WebSocket connection and fans serial records out to
//! all of them. Each connection is represented by the sending half of its
//! own unbounded channel; the connection's send task drains the other half
//! into the socket, so records reach every client in the order they were
//! broadcast.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Manages all WebSocket connections
pub struct ConnectionHub {
    /// Active connections: ConnectionId → ConnectionHandle
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
    /// Configuration
    config: HubConfig,
}

/// Configuration for the connection hub
///
/// Read from the `[hub]` section of the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_connections() -> usize {
    1000
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

/// Handle for sending records to a specific connection
pub struct ConnectionHandle {
    /// Channel sender for this connection
    pub sender: mpsc::UnboundedSender<String>,
    /// When the connection was registered
    pub connected_at: Instant,
}

/// Why a connection left the hub
///
/// Every removal goes through the same `Connected → Closed` transition,
/// whichever side noticed the connection was gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The client closed the socket or the transport failed
    ClientClosed,
    /// Delivering a broadcast to the connection failed
    SendFailed,
    /// The server is shutting down
    ServerShutdown,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CloseReason::ClientClosed => "client_closed",
            CloseReason::SendFailed => "send_failed",
            CloseReason::ServerShutdown => "server_shutdown",
        };
        f.write_str(s)
    }
}

/// Outcome of a single broadcast
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections a send was attempted on
    pub attempted: usize,
    /// Sends that were accepted
    pub delivered: usize,
    /// Connections removed because their send failed
    pub evicted: Vec<ConnectionId>,
}

impl ConnectionHub {
    /// Create a new connection hub
    pub fn new(config: HubConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register a new WebSocket connection
    ///
    /// Returns the connection ID on success, or an error if the connection
    /// limit has been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<String>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        let handle = ConnectionHandle {
            sender,
            connected_at: Instant::now(),
        };
        connections.insert(id.clone(), handle);
        let total = connections.len();
        drop(connections);

        tracing::info!(connection_id = %id, connections = total, "WebSocket connected");
        Ok(id)
    }

    /// Unregister a connection
    ///
    /// Unknown or already removed IDs are ignored. Returns whether the
    /// connection was still registered.
    pub async fn unregister(&self, id: &str) -> bool {
        self.close(id, CloseReason::ClientClosed).await
    }

    /// Move a connection to the closed state, removing it from the hub
    pub async fn close(&self, id: &str, reason: CloseReason) -> bool {
        let removed = self.connections.write().await.remove(id);

        match removed {
            Some(handle) => {
                tracing::info!(
                    connection_id = %id,
                    reason = %reason,
                    connected_secs = handle.connected_at.elapsed().as_secs(),
                    "WebSocket disconnected"
                );
                true
            }
            None => {
                tracing::trace!(connection_id = %id, reason = %reason, "Connection already closed");
                false
            }
        }
    }

    /// Close every registered connection
    ///
    /// Dropping the senders ends each connection's send task, which closes
    /// the socket.
    pub async fn close_all(&self, reason: CloseReason) -> usize {
        let drained: Vec<ConnectionId> = {
            let mut connections = self.connections.write().await;
            connections.drain().map(|(id, _)| id).collect()
        };

        for id in &drained {
            tracing::info!(connection_id = %id, reason = %reason, "WebSocket disconnected");
        }
        drained.len()
    }

    /// Send `text` to every registered connection
    ///
    /// Works on a snapshot taken under the read lock, so registrations that
    /// race with the broadcast may or may not see this record. A failed send
    /// evicts that connection and delivery continues with the rest; failures
    /// never reach the caller.
    pub async fn broadcast(&self, text: &str) -> BroadcastReport {
        let snapshot: Vec<(ConnectionId, mpsc::UnboundedSender<String>)> = {
            let connections = self.connections.read().await;
            connections
                .iter()
                .map(|(id, handle)| (id.clone(), handle.sender.clone()))
                .collect()
        };

        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();

        for (id, sender) in snapshot {
            report.attempted += 1;
            match sender.send(text.to_string()) {
                Ok(()) => report.delivered += 1,
                Err(_) => {
                    tracing::warn!(connection_id = %id, "WebSocket send failed, evicting connection");
                    failed.push(id);
                }
            }
        }

        for id in failed {
            if self.close(&id, CloseReason::SendFailed).await {
                report.evicted.push(id);
            }
        }

        tracing::trace!(
            attempted = report.attempted,
            delivered = report.delivered,
            evicted = report.evicted.len(),
            "Broadcast record"
        );

        report
    }

    /// Get the current connection count
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Check whether a connection is still registered
    pub async fn is_registered(&self, id: &str) -> bool {
        self.connections.read().await.contains_key(id)
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),
}
