use std::sync::{Arc, Mutex};

#[cfg(feature = "tracing")]
use tracing::instrument;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures::StreamExt;

use crate::transport::{ByteStream, Transport};
use crate::types::{HttpRequest, HttpResponse};
use crate::{Error, Result};

/// One item of a mocked streaming body.
#[derive(Debug)]
pub enum MockChunk {
    /// Raw bytes, delivered as-is (no newline is appended).
    Bytes(Bytes),
    /// A failure injected at this point of the stream.
    Fail(Error),
}

/// A mock implementation of the [`Transport`] trait for testing purposes.
///
/// Responses are consumed by the first request that uses them. Every request
/// is recorded, so tests can inspect the payload the client built.
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Streaming body returned by the next streaming request.
    stream_chunks: Arc<Mutex<Vec<MockChunk>>>,
    /// Response returned by the next non-streaming request.
    http_response: Arc<Mutex<Option<HttpResponse>>>,
    /// Failure returned by the next request of either kind, before any body.
    request_failure: Arc<Mutex<Option<Error>>>,
    /// Every request received, oldest first.
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    /// Creates a new, empty [`MockTransport`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Streams each line followed by `\n`, one line per network read.
    pub fn with_stream_lines<I, L>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let chunks = lines
            .into_iter()
            .map(|line| MockChunk::Bytes(Bytes::from(format!("{}\n", line.as_ref()))))
            .collect();
        self.with_stream_chunks(chunks)
    }

    /// Streams raw byte slices exactly as given.
    pub fn with_stream_bytes(self, bytes: Vec<Bytes>) -> Self {
        self.with_stream_chunks(bytes.into_iter().map(MockChunk::Bytes).collect())
    }

    /// Streams the given chunks, including injected failures.
    pub fn with_stream_chunks(self, chunks: Vec<MockChunk>) -> Self {
        *self.stream_chunks.lock().unwrap() = chunks;
        self
    }

    /// Configures the mock to return a specific [`HttpResponse`]
    /// for the next non-streaming request.
    pub fn with_http_response(self, response: HttpResponse) -> Self {
        *self.http_response.lock().unwrap() = Some(response);
        self
    }

    /// Shorthand for [`with_http_response`](Self::with_http_response) with a body.
    pub fn with_body(self, body: impl Into<Bytes>) -> Self {
        self.with_http_response(HttpResponse {
            body: Some(body.into()),
        })
    }

    /// Makes the next request fail before any response is produced.
    pub fn with_request_failure(self, error: Error) -> Self {
        *self.request_failure.lock().unwrap() = Some(error);
        self
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record(&self, request: HttpRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request);
        match self.request_failure.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    /// Returns the configured response, or a response without a body.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request)))]
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.record(request)?;
        if let Some(response) = self.http_response.lock().unwrap().take() {
            Ok(response)
        } else {
            Ok(HttpResponse { body: None })
        }
    }

    /// Returns the configured chunks as a byte stream, or an empty stream.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request)))]
    async fn send_http_stream_request(&self, request: HttpRequest) -> Result<ByteStream> {
        self.record(request)?;
        let chunks = self
            .stream_chunks
            .lock()
            .unwrap()
            .drain(..)
            .collect::<Vec<_>>();

        let byte_stream = stream::iter(chunks)
            .map(|chunk| match chunk {
                MockChunk::Bytes(bytes) => Ok(bytes),
                MockChunk::Fail(error) => Err(error),
            })
            .boxed();
        Ok(byte_stream)
    }
}
