//! The lazy fragment sequence returned by streaming generation.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::parser::{ChunkEvent, ChunkParser};
use crate::transport::ByteStream;
use crate::Result;

/// Text fragments of one streaming generation, in arrival order.
///
/// The stream ends after the chunk flagged `done`, when the connection
/// closes, or right after yielding a transport error. Empty fragments are
/// never yielded; malformed lines are skipped and counted. Dropping the
/// stream closes the underlying connection.
pub struct FragmentStream {
    parser: Option<ChunkParser<ByteStream>>,
    skipped: usize,
}

impl FragmentStream {
    pub fn new(bytes: ByteStream) -> Self {
        Self {
            parser: Some(ChunkParser::new(bytes)),
            skipped: 0,
        }
    }

    /// Number of malformed lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Drains the stream and concatenates every fragment.
    pub async fn collect_text(mut self) -> Result<String> {
        use futures::StreamExt;

        let mut text = String::new();
        while let Some(fragment) = self.next().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }
}

impl Stream for FragmentStream {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            let Some(parser) = this.parser.as_mut() else {
                return Poll::Ready(None);
            };

            let event = match Pin::new(parser).poll_next(cx) {
                Poll::Ready(event) => event,
                Poll::Pending => return Poll::Pending,
            };

            match event {
                None => {
                    this.parser = None;
                    return Poll::Ready(None);
                }
                Some(Err(e)) => {
                    this.parser = None;
                    return Poll::Ready(Some(Err(e)));
                }
                #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
                Some(Ok(ChunkEvent::Malformed { line, error })) => {
                    this.skipped += 1;
                    #[cfg(feature = "metrics")]
                    counter!("stockdash.malformed_chunks_total").increment(1);
                    #[cfg(feature = "tracing")]
                    tracing::warn!(%line, %error, "skipping malformed stream chunk");
                }
                Some(Ok(ChunkEvent::Chunk(chunk))) => {
                    if chunk.done {
                        this.parser = None;
                    }
                    if !chunk.response.is_empty() {
                        return Poll::Ready(Some(Ok(chunk.response)));
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for FragmentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentStream")
            .field("finished", &self.parser.is_none())
            .field("skipped", &self.skipped)
            .finish()
    }
}
