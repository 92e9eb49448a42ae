//! Relay Loop
//!
//! Forwards every record from the line reader to the connection hub,
//! verbatim and in the order it was read. The loop only ends when the
//! serial stream errors (fatal) or runs out.

use futures_util::{Stream, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::serial::{Record, SerialError};
use crate::websocket::ConnectionHub;

/// Counters exposed through the health endpoint
#[derive(Debug, Default)]
pub struct RelayStats {
    records_relayed: AtomicU64,
    connections_evicted: AtomicU64,
}

impl RelayStats {
    pub fn records_relayed(&self) -> u64 {
        self.records_relayed.load(Ordering::Relaxed)
    }

    pub fn connections_evicted(&self) -> u64 {
        self.connections_evicted.load(Ordering::Relaxed)
    }

    fn record(&self, evicted: usize) {
        self.records_relayed.fetch_add(1, Ordering::Relaxed);
        self.connections_evicted
            .fetch_add(evicted as u64, Ordering::Relaxed);
    }
}

/// Drives records from a line reader into the hub
pub struct Relay {
    hub: Arc<ConnectionHub>,
    stats: Arc<RelayStats>,
}

impl Relay {
    pub fn new(hub: Arc<ConnectionHub>, stats: Arc<RelayStats>) -> Self {
        Self { hub, stats }
    }

    /// Run until the record stream ends or fails
    ///
    /// A serial error is logged and returned; the stream is not reopened.
    pub async fn run<S>(&self, records: S) -> Result<(), RelayError>
    where
        S: Stream<Item = Result<Record, SerialError>>,
    {
        let mut records = std::pin::pin!(records);

        while let Some(next) = records.next().await {
            match next {
                Ok(record) => {
                    let report = self.hub.broadcast(record.as_str()).await;
                    self.stats.record(report.evicted.len());
                    tracing::debug!(
                        record = %record,
                        clients = report.delivered,
                        "Relayed record"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Serial device error, relay stopping");
                    return Err(RelayError::Serial(e));
                }
            }
        }

        tracing::warn!(
            records = self.stats.records_relayed(),
            "Serial stream ended"
        );
        Ok(())
    }

    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.stats
    }
}

/// Errors that stop the relay
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Serial stream failed: {0}")]
    Serial(#[from] SerialError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::LineReader;
    use futures_util::stream;
    use tokio::sync::mpsc;

    fn relay() -> (Relay, Arc<ConnectionHub>) {
        let hub = Arc::new(ConnectionHub::default());
        let relay = Relay::new(Arc::clone(&hub), Arc::new(RelayStats::default()));
        (relay, hub)
    }

    #[tokio::test]
    async fn test_relays_records_verbatim_in_order() {
        let (relay, hub) = relay();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx).await.unwrap();

        let input: &[u8] = b"C 0\nC 100\ngarbage\nC 19.5\r\n";
        relay.run(LineReader::from_reader(input)).await.unwrap();

        assert_eq!(rx.try_recv().unwrap(), "C 0");
        assert_eq!(rx.try_recv().unwrap(), "C 100");
        assert_eq!(rx.try_recv().unwrap(), "garbage");
        assert_eq!(rx.try_recv().unwrap(), "C 19.5\r");
        assert!(rx.try_recv().is_err());
        assert_eq!(relay.stats().records_relayed(), 4);
    }

    #[tokio::test]
    async fn test_runs_without_clients() {
        let (relay, _hub) = relay();
        let input: &[u8] = b"C 1\nC 2\n";

        relay.run(LineReader::from_reader(input)).await.unwrap();
        assert_eq!(relay.stats().records_relayed(), 2);
    }

    #[tokio::test]
    async fn test_serial_error_is_fatal() {
        let (relay, hub) = relay();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx).await.unwrap();

        let records = stream::iter(vec![
            Ok(Record::from("C 1")),
            Err(SerialError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device disconnected",
            ))),
            Ok(Record::from("C 2")),
        ]);

        let result = relay.run(records).await;
        assert!(matches!(result, Err(RelayError::Serial(SerialError::Io(_)))));

        // Nothing after the error is relayed
        assert_eq!(rx.try_recv().unwrap(), "C 1");
        assert!(rx.try_recv().is_err());
        assert_eq!(relay.stats().records_relayed(), 1);
    }

    #[tokio::test]
    async fn test_line_noise_does_not_stop_relay() {
        let (relay, hub) = relay();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx).await.unwrap();

        let mut input = vec![b'x'; 5000];
        input.extend_from_slice(b"\nC 20.0\n");
        relay.run(LineReader::from_reader(&input[..])).await.unwrap();

        assert_eq!(rx.try_recv().unwrap(), "C 20.0");
        assert!(rx.try_recv().is_err());
        assert_eq!(relay.stats().records_relayed(), 1);
    }

    #[tokio::test]
    async fn test_counts_evicted_connections() {
        let (relay, hub) = relay();
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        hub.register(tx).await.unwrap();
        drop(rx);

        let input: &[u8] = b"C 1\nC 2\n";
        relay.run(LineReader::from_reader(input)).await.unwrap();

        assert_eq!(relay.stats().connections_evicted(), 1);
        assert_eq!(hub.connection_count().await, 0);
    }
}
