//! Application State
//!
//! Shared state accessible by all handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::relay::RelayStats;
use crate::websocket::{ConnectionHub, HubConfig};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// WebSocket connection hub the relay broadcasts through
    pub hub: Arc<ConnectionHub>,
    /// Relay counters
    pub stats: Arc<RelayStats>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Responder for non-upgrade requests
    pub static_files: ServeDir,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state around an existing hub and relay counters
    pub fn new(hub: Arc<ConnectionHub>, stats: Arc<RelayStats>, config: ServerConfig) -> Self {
        let static_files = ServeDir::new(&config.static_dir);
        Self {
            hub,
            stats,
            config: Arc::new(config),
            static_files,
            start_time: Instant::now(),
        }
    }

    /// Create state with a fresh hub, for a server without a relay attached
    pub fn standalone(config: ServerConfig, hub_config: HubConfig) -> Self {
        Self::new(
            Arc::new(ConnectionHub::new(hub_config)),
            Arc::new(RelayStats::default()),
            config,
        )
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
