//! Record stream over the serial device

use futures_util::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncRead;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tokio_util::codec::FramedRead;

use super::codec::RecordCodec;
use super::error::{SerialError, SerialResult};
use super::record::Record;
use crate::config::SerialConfig;

/// Lazy stream of records read from a byte source
///
/// Not restartable: once the source errors or ends, the stream is done.
pub struct LineReader<R> {
    inner: FramedRead<R, RecordCodec>,
}

impl LineReader<SerialStream> {
    /// Open the configured serial device
    pub fn open(config: &SerialConfig) -> SerialResult<Self> {
        let port = tokio_serial::new(&config.path, config.baud_rate)
            .open_native_async()
            .map_err(|source| SerialError::Open {
                path: config.path.clone(),
                source,
            })?;

        tracing::info!(
            path = %config.path,
            baud_rate = config.baud_rate,
            "Serial port open"
        );

        Ok(Self::with_codec(
            port,
            RecordCodec::with_max_length(config.max_line_length),
        ))
    }
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Read records from any async byte source
    pub fn from_reader(reader: R) -> Self {
        Self::with_codec(reader, RecordCodec::new())
    }

    pub fn with_codec(reader: R, codec: RecordCodec) -> Self {
        Self {
            inner: FramedRead::new(reader, codec),
        }
    }
}

impl<R: AsyncRead + Unpin> Stream for LineReader<R> {
    type Item = SerialResult<Record>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_reads_records_in_order() {
        let input: &[u8] = b"C 20.0\nC 20.5\nC 21.0\n";
        let records: Vec<String> = LineReader::from_reader(input)
            .map(|r| r.unwrap().into_string())
            .collect()
            .await;

        assert_eq!(records, vec!["C 20.0", "C 20.5", "C 21.0"]);
    }

    #[tokio::test]
    async fn test_truncates_final_partial_line() {
        let input: &[u8] = b"C 20.0\nC 2";
        let records: Vec<String> = LineReader::from_reader(input)
            .map(|r| r.unwrap().into_string())
            .collect()
            .await;

        assert_eq!(records, vec!["C 20.0"]);
    }

    #[tokio::test]
    async fn test_empty_source_ends_immediately() {
        let input: &[u8] = b"";
        let mut reader = LineReader::from_reader(input);
        assert!(reader.next().await.is_none());
    }

    #[tokio::test]
    async fn test_split_reads_are_reassembled() {
        let source = tokio_test_reader(&[b"C 1", b"8.5\nC", b" 19\n"]);
        let records: Vec<String> = LineReader::from_reader(source)
            .map(|r| r.unwrap().into_string())
            .collect()
            .await;

        assert_eq!(records, vec!["C 18.5", "C 19"]);
    }

    #[tokio::test]
    async fn test_open_missing_device_fails() {
        let config = SerialConfig {
            path: "/dev/does-not-exist-monitor".to_string(),
            ..SerialConfig::default()
        };

        match LineReader::open(&config) {
            Err(SerialError::Open { path, .. }) => assert_eq!(path, config.path),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("opening a missing device should fail"),
        }
    }

    /// Byte source that yields each chunk in a separate read
    fn tokio_test_reader(chunks: &[&[u8]]) -> impl AsyncRead + Unpin {
        let (client, mut server) = tokio::io::duplex(64);
        let chunks: Vec<Vec<u8>> = chunks.iter().map(|c| c.to_vec()).collect();
        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            for chunk in chunks {
                server.write_all(&chunk).await.unwrap();
                tokio::task::yield_now().await;
            }
        });
        client
    }
}
