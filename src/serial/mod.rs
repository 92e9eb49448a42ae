//! Serial Line Reader
//!
//! Turns the raw serial byte stream into newline-delimited records:
//!
//! - **codec**: `\n` framing on top of `tokio_util::codec`
//! - **reader**: Opens the device and exposes the record stream
//! - **record**: The raw text of one serial line
//! - **error**: Error types
//!
//! # Framing
//!
//! ```text
//!   "C 23.4\nC 23.5\nC 2"  →  "C 23.4", "C 23.5"   (trailing "C 2" dropped)
//! ```
//!
//! Only the `\n` delimiter is stripped; a `\r` sent by the device stays in
//! the record. An unterminated line at end of stream is never emitted.
//!
//! # Example
//!
//! ```rust,no_run
//! use futures_util::StreamExt;
//! use monitor::config::SerialConfig;
//! use monitor::serial::LineReader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut reader = LineReader::open(&SerialConfig::default())?;
//!     while let Some(record) = reader.next().await {
//!         println!("{}", record?);
//!     }
//!     Ok(())
//! }
//! ```

mod codec;
mod error;
mod reader;
mod record;

pub use codec::{RecordCodec, DEFAULT_MAX_LINE_LENGTH};
pub use error::{SerialError, SerialResult};
pub use reader::LineReader;
pub use record::Record;
