//! Chart Client
//!
//! The receiving end of the relay: turns raw `C <celsius>` records into
//! Fahrenheit chart points.
//!
//! - **decoder**: Record parsing, unit conversion and the per-connection
//!   decoder state machine
//! - **series**: Chart point and the unbounded series backing a chart
//! - **watch**: Terminal client that follows a relay over WebSocket
//!
//! # Example
//!
//! ```rust
//! use monitor::client::ClientDecoder;
//!
//! let mut decoder = ClientDecoder::new();
//! assert_eq!(decoder.on_message("C 100").map(|p| p.y.as_str()), Some("212.0"));
//! assert!(decoder.on_message("garbage").is_none());
//! assert_eq!(decoder.series().len(), 1);
//! ```

mod decoder;
mod series;
mod watch;

pub use decoder::{
    celsius_to_fahrenheit, decode, decode_at, format_reading, parse_celsius, ClientDecoder,
    ClientState, TAG_PREFIX,
};
pub use series::{ChartPoint, ChartSeries};
pub use watch::{watch, OutputFormat, WatchError};
