//! Response bodies

use serde::{Deserialize, Serialize};

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: String,
    /// Live WebSocket connections
    pub connections: usize,
    /// Records relayed since startup
    pub records_relayed: u64,
    /// Connections dropped after a failed send
    pub connections_evicted: u64,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
