//! Newline-delimited JSON parser for streaming generation responses.
//!
//! Bytes arrive in arbitrary slices; the parser buffers them until a full
//! line is available and then classifies that line.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

use crate::types::generate::GenerateChunk;
use crate::Result;

/// One classified, non-blank line of a streaming response.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkEvent {
    /// A well-formed chunk object.
    Chunk(GenerateChunk),
    /// A line that could not be decoded as a chunk.
    Malformed {
        /// The offending line, trimmed.
        line: String,
        /// Why decoding failed.
        error: String,
    },
}

/// Splits a byte stream into [`ChunkEvent`]s.
///
/// Blank lines are dropped. When the inner stream ends, a non-blank
/// remainder without a trailing newline is classified like any other line.
/// Errors from the inner stream are passed through unchanged.
pub struct ChunkParser<S>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    inner: S,
    buffer: Vec<u8>,
    exhausted: bool,
}

impl<S> ChunkParser<S>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            exhausted: false,
        }
    }

    /// Takes complete lines off the front of the buffer until one of them
    /// is non-blank. Returns `None` when no complete non-blank line is buffered.
    fn next_buffered_line(&mut self) -> Option<ChunkEvent> {
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes = self.buffer.drain(..=newline_pos).collect::<Vec<u8>>();
            if let Some(event) = classify(&line_bytes) {
                return Some(event);
            }
        }
        None
    }
}

/// Classifies a raw line; `None` for blank (keep-alive) lines.
///
/// The bytes are decoded as-is, so a line with invalid UTF-8 is malformed
/// exactly as it would be in a blocking response body.
fn classify(line_bytes: &[u8]) -> Option<ChunkEvent> {
    let line = line_bytes.trim_ascii();
    if line.is_empty() {
        return None;
    }

    Some(match GenerateChunk::from_slice(line) {
        Ok(chunk) => ChunkEvent::Chunk(chunk),
        Err(e) => ChunkEvent::Malformed {
            line: String::from_utf8_lossy(line).into_owned(),
            error: e.to_string(),
        },
    })
}

impl<S> Stream for ChunkParser<S>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    type Item = Result<ChunkEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(event) = this.next_buffered_line() {
                return Poll::Ready(Some(Ok(event)));
            }

            if this.exhausted {
                // Whatever is left has no trailing newline.
                let rest = std::mem::take(&mut this.buffer);
                return Poll::Ready(classify(&rest).map(Ok));
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => this.exhausted = true,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
