use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Url};

use crate::transport::{ByteStream, Transport};
use crate::types::{HttpRequest, HttpResponse, ServerError};
use crate::{Error, Result};

/// A [`Transport`] implementation that uses the `reqwest` crate for making HTTP requests.
///
/// This is the default transport used by [`InferenceClient`](crate::InferenceClient) if no
/// custom transport is provided.
///
/// The configured timeout bounds connecting and each read. Blocking requests
/// are additionally bounded by it as a whole; streaming requests are not, so
/// a long generation keeps flowing as long as the server keeps sending.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a new `ReqwestTransport`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the Ollama server. Endpoint paths are
    ///   appended to it, so `http://proxy/ollama` posts to `/ollama/api/generate`.
    /// * `timeout` - Connect/read timeout, and total timeout of blocking requests.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Client`] if the `reqwest` client cannot be built.
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Helper to build and send a reqwest request, handling common logic.
    ///
    /// Non-success statuses become [`Error::Server`] carrying the server's
    /// `error` message when it sent one.
    async fn build_and_send_request(
        &self,
        request: HttpRequest,
        total_timeout: Option<Duration>,
    ) -> Result<reqwest::Response> {
        let url = self
            .base_url
            .join(request.url.trim_start_matches('/'))
            .map_err(|e| Error::Client(e.to_string()))?;

        let mut request_builder = self.client.post(url);

        if let Some(timeout) = total_timeout {
            request_builder = request_builder.timeout(timeout);
        }

        if let Some(body) = request.body {
            request_builder = request_builder.json(&body);
        }

        let response = request_builder.send().await.map_err(Error::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.map_err(Error::Transport)?;
        let message = match serde_json::from_slice::<ServerError>(&body) {
            Ok(err) => err.error,
            Err(_) => {
                let text = String::from_utf8_lossy(&body).trim().to_string();
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("unknown status").to_string()
                } else {
                    text
                }
            }
        };

        Err(Error::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    /// Sends a non-streaming HTTP request using `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Transport`] if the request fails, times out, or the
    /// body cannot be read, and an [`Error::Server`] on a non-success status.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(url = %request.url)))]
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self
            .build_and_send_request(request, Some(self.timeout))
            .await?;
        let response_bytes = response.bytes().await.map_err(Error::Transport)?;
        Ok(HttpResponse {
            body: Some(response_bytes),
        })
    }

    /// Sends a streaming HTTP request using `reqwest` and returns a stream of response bytes.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Transport`] if the connection cannot be established and an
    /// [`Error::Server`] on a non-success status. Failures after that surface as
    /// items of the returned stream.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(url = %request.url)))]
    async fn send_http_stream_request(&self, request: HttpRequest) -> Result<ByteStream> {
        let response = self.build_and_send_request(request, None).await?;
        let stream = response
            .bytes_stream()
            .map(|item| item.map_err(Error::Transport))
            .boxed();
        Ok(stream)
    }
}
