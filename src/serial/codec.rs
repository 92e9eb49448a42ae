//! Newline framing for the serial stream

use tokio_util::{
    bytes::{Buf, BytesMut},
    codec::Decoder,
};

use super::error::SerialError;
use super::record::Record;

/// Longest line kept before it is dropped as line noise
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Splits a byte stream into `\n`-terminated records
///
/// Like `LinesCodec`, a line longer than the limit is discarded up to its
/// newline and framing resumes on the next line. Unlike `LinesCodec`, a
/// partial line left in the buffer at end of stream is discarded instead
/// of being emitted.
#[derive(Debug, Clone)]
pub struct RecordCodec {
    max_length: usize,
    /// Where to resume the newline scan, so bytes are only inspected once
    next_index: usize,
    /// Set while skipping the rest of an over-long line
    is_discarding: bool,
}

impl RecordCodec {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            is_discarding: false,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RecordCodec {
    type Item = Record;
    type Error = SerialError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let newline = src[self.next_index..].iter().position(|b| *b == b'\n');

            match (self.is_discarding, newline) {
                (true, Some(offset)) => {
                    // Drop the tail of the over-long line, newline included
                    src.advance(self.next_index + offset + 1);
                    self.next_index = 0;
                    self.is_discarding = false;
                }
                (true, None) => {
                    src.advance(src.len());
                    self.next_index = 0;
                    return Ok(None);
                }
                (false, Some(offset)) => {
                    let end = self.next_index + offset;
                    self.next_index = 0;

                    if end > self.max_length {
                        tracing::warn!(
                            bytes = end,
                            limit = self.max_length,
                            "Discarding over-long serial line"
                        );
                        src.advance(end + 1);
                        continue;
                    }

                    let line = src.split_to(end + 1);
                    let text = String::from_utf8_lossy(&line[..end]).into_owned();
                    return Ok(Some(Record::new(text)));
                }
                (false, None) if src.len() > self.max_length => {
                    tracing::warn!(
                        limit = self.max_length,
                        "Serial line exceeds limit, discarding until next newline"
                    );
                    src.advance(src.len());
                    self.next_index = 0;
                    self.is_discarding = true;
                    return Ok(None);
                }
                (false, None) => {
                    self.next_index = src.len();
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(record) = self.decode(src)? {
            return Ok(Some(record));
        }

        if !src.is_empty() {
            tracing::debug!(
                bytes = src.len(),
                "Discarding unterminated line at end of stream"
            );
            src.clear();
        }
        self.next_index = 0;
        self.is_discarding = false;
        Ok(None)
    }
}
