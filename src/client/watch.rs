//! Terminal chart client
//!
//! Connects to a running relay and prints every decoded point as it
//! arrives, one per line.

use futures_util::StreamExt;
use std::io::Write;
use thiserror::Error;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::decoder::ClientDecoder;
use super::series::ChartPoint;

/// How decoded points are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `timestamp  value °F`
    Table,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    /// Unknown values fall back to the table format
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Table,
        }
    }
}

/// Errors from the watch client
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Follow the relay at `url` until it closes the connection
///
/// Returns the number of points decoded.
pub async fn watch<W: Write>(
    url: &str,
    format: OutputFormat,
    out: &mut W,
) -> Result<usize, WatchError> {
    let (stream, _) = connect_async(url).await?;
    tracing::info!(url = %url, "Connected to relay");

    let (_write, mut read) = stream.split();
    let mut decoder = ClientDecoder::new();

    while let Some(message) = read.next().await {
        match message? {
            Message::Text(text) => {
                if let Some(point) = decoder.on_message(&text) {
                    write_point(out, point, format)?;
                } else {
                    tracing::debug!(text = %text, "Discarded record");
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    decoder.on_close();
    tracing::info!(points = decoder.series().len(), "Relay connection closed");
    Ok(decoder.series().len())
}

/// Print a single point in the requested format
pub fn write_point<W: Write>(
    out: &mut W,
    point: &ChartPoint,
    format: OutputFormat,
) -> Result<(), WatchError> {
    match format {
        OutputFormat::Table => writeln!(out, "{}  {:>7} °F", point.x, point.y)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(point)?)?,
    }
    out.flush()?;
    Ok(())
}
