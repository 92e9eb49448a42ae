//! WebSocket Real-Time Streaming
//!
//! Pushes every serial record to connected browsers as it arrives.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Tracks active connections and broadcasts records
//! - **Handler**: Upgrade gateway and per-connection lifecycle
//!
//! ## Usage
//!
//! Clients may connect on any path. Frames are plain text, identical to the
//! lines read from the serial device (e.g. `C 23.4`). Nothing needs to be
//! sent by the client.
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:3000');
//!
//! ws.onmessage = (event) => {
//!   console.log('Received:', event.data);
//! };
//! ```

mod handler;
mod hub;

pub use handler::{accept_upgrade, websocket_handler, Handshake};
pub use hub::{BroadcastReport, CloseReason, ConnectionHub, ConnectionId, HubConfig, HubError};
