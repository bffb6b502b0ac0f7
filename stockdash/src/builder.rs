use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

use reqwest::Url;

use crate::config::EndpointConfig;
use crate::transport::{ReqwestTransport, Transport};
use crate::{Error, InferenceClient, Result};

/// A builder for constructing an [`InferenceClient`].
///
/// - Uses `http://localhost:11434` unless a base URL or an [`EndpointConfig`] is given.
/// - Uses a 30 second timeout and `deepseek-r1` as the default model.
/// - Uses `reqwest`-based transport by default - [`ReqwestTransport`].
///
/// The builder never reads the environment; use [`EndpointConfig::from_env`]
/// and pass the result to [`config`](InferenceClientBuilder::config) for that.
pub struct InferenceClientBuilder {
    config: EndpointConfig,
    transport: Option<Arc<dyn Transport + Send + Sync>>,
}

impl InferenceClientBuilder {
    /// Creates a new [`InferenceClientBuilder`]. This method is called by [`InferenceClient::builder`]
    pub(crate) fn new() -> Self {
        InferenceClientBuilder {
            config: EndpointConfig::default(),
            transport: None,
        }
    }

    /// Replaces every endpoint setting at once.
    pub fn config(mut self, config: EndpointConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the base URL of the Ollama server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Sets the timeout.
    ///
    /// It bounds connecting and every read of a streaming response, and the
    /// whole exchange of a blocking request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Sets the model used by requests that don't name one.
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Sets a custom transport implementation for the client.
    ///
    /// When set, the base URL and timeout are left to the transport.
    /// For testing, you can use [`MockTransport`](crate::transport::MockTransport).
    pub fn transport(mut self, transport: Arc<dyn Transport + Send + Sync>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the [`InferenceClient`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Client`](variant@Error::Client) if the base URL is invalid or if
    /// the `reqwest` client cannot be initialized.
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub fn build(self) -> Result<InferenceClient> {
        let transport = if let Some(t) = self.transport {
            t
        } else {
            let base_url = Url::parse(self.config.base_url.trim_end_matches('/'))
                .map_err(|e| Error::Client(format!("Invalid base URL: {}", e)))?;

            Arc::new(ReqwestTransport::new(base_url, self.config.timeout)?)
        };

        Ok(InferenceClient {
            transport,
            default_model: self.config.model,
        })
    }
}
