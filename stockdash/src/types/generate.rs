//! Contains all data structures used with the `/api/generate` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stockdash_macros::FromJson;

use crate::stream::FragmentStream;

/// Payload keys owned by the request itself; extra parameters may not shadow them.
const RESERVED_KEYS: [&str; 3] = ["model", "prompt", "stream"];

/// A single generation request.
///
/// The same request drives both blocking and streaming mode; the `stream`
/// flag selects which one [`InferenceClient::generate`](crate::InferenceClient::generate) uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    /// The prompt, forwarded unchanged. An empty prompt is allowed.
    pub prompt: String,
    /// Model name. `None` falls back to the client's default model.
    pub model: Option<String>,
    /// Whether the response should be streamed back.
    pub stream: bool,
    /// Extra generation parameters (e.g. `temperature`) forwarded verbatim.
    pub params: Map<String, Value>,
}

impl GenerateRequest {
    /// Creates a blocking request for `prompt` with the client's default model.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Sets the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the `stream` flag.
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Adds an extra parameter to the payload.
    ///
    /// `model`, `prompt` and `stream` are reserved; setting them here is ignored.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            #[cfg(feature = "tracing")]
            tracing::warn!(key = %key, "ignoring reserved generation parameter");
            return self;
        }
        self.params.insert(key, value.into());
        self
    }

    /// Shorthand for the `temperature` parameter.
    pub fn temperature(self, temperature: f64) -> Self {
        self.param("temperature", temperature)
    }

    /// Builds the wire payload. Both modes go through here.
    pub(crate) fn payload<'a>(&'a self, default_model: &'a str) -> GeneratePayload<'a> {
        GeneratePayload {
            model: self.model.as_deref().unwrap_or(default_model),
            prompt: &self.prompt,
            stream: self.stream,
            params: &self.params,
        }
    }
}

/// Borrowed view of a [`GenerateRequest`] as it is sent over the wire.
#[derive(Serialize, Debug)]
pub(crate) struct GeneratePayload<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    #[serde(flatten)]
    pub params: &'a Map<String, Value>,
}

/// The body of a blocking generation response. Other fields the server
/// sends are ignored.
#[derive(Deserialize, Serialize, Default, FromJson, Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    /// The generated text; missing means empty.
    #[serde(default)]
    pub response: String,
}

/// One newline-delimited JSON object of a streaming response.
#[derive(Deserialize, Serialize, Default, FromJson, Debug, Clone, PartialEq)]
pub struct GenerateChunk {
    /// Text produced since the previous chunk; often empty on the final one.
    #[serde(default)]
    pub response: String,
    /// Set on the last chunk of a generation.
    #[serde(default)]
    pub done: bool,
}

/// Result of [`InferenceClient::generate`](crate::InferenceClient::generate).
pub enum Generation {
    /// Blocking mode: the complete, trimmed answer.
    Complete(String),
    /// Streaming mode: fragments in arrival order.
    Streaming(FragmentStream),
}

impl std::fmt::Debug for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generation::Complete(text) => f.debug_tuple("Complete").field(text).finish(),
            Generation::Streaming(stream) => f
                .debug_struct("Streaming")
                .field("skipped", &stream.skipped())
                .finish(),
        }
    }
}
