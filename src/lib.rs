//! # Monitor
//!
//! Serial temperature monitor - relays a serial sensor stream to live browser
//! charts over WebSocket.
//!
//! ## Data Flow
//!
//! ```text
//!   serial bytes → LineReader → Relay → ConnectionHub → WebSocket clients → ClientDecoder → chart
//! ```
//!
//! ## Modules
//!
//! - [`serial`]: Newline framing over the serial device
//! - [`websocket`]: Connection hub and upgrade gateway
//! - [`relay`]: Loop forwarding records to the hub
//! - [`client`]: Record decoding and the chart series
//! - [`api`]: HTTP listener with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use monitor::{AppState, Config, ConnectionHub, HubConfig, LineReader, Relay, RelayStats};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
//!     let stats = Arc::new(RelayStats::default());
//!
//!     // Relay serial records to every connected client
//!     let reader = LineReader::open(&config.serial)?;
//!     let relay = Relay::new(Arc::clone(&hub), Arc::clone(&stats));
//!     tokio::spawn(async move { relay.run(reader).await });
//!
//!     // Serve WebSocket clients and the static page
//!     let state = AppState::new(hub, stats, config.server.clone());
//!     monitor::api::serve(state, &config.server).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod logging;
pub mod relay;
pub mod serial;
pub mod websocket;

// Re-export top-level types for convenience
pub use api::{build_router, serve, AppState, ServerError};

pub use client::{ChartPoint, ChartSeries, ClientDecoder, ClientState};

pub use config::{Config, ConfigError, LoggingConfig, SerialConfig, ServerConfig};

pub use relay::{Relay, RelayError, RelayStats};

pub use serial::{LineReader, Record, RecordCodec, SerialError};

pub use websocket::{
    BroadcastReport, CloseReason, ConnectionHub, ConnectionId, HubConfig, HubError,
    websocket_handler,
};
