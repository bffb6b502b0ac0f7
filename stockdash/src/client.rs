use futures::StreamExt;

#[cfg(feature = "metrics")]
use metrics::counter;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::builder::InferenceClientBuilder;
use crate::stream::FragmentStream;
use crate::types::generate::{GenerateRequest, GenerateResponse, Generation};
use crate::types::HttpRequest;
use crate::InferenceClient;
use crate::{Error, Result};

const GENERATE_PATH: &str = "/api/generate";

impl InferenceClient {
    pub fn builder() -> InferenceClientBuilder {
        InferenceClientBuilder::new()
    }

    /// The model used by requests that don't name one.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Runs `request` in the mode its `stream` flag selects.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(stream = request.stream)))]
    pub async fn generate(&self, request: GenerateRequest) -> Result<Generation> {
        if request.stream {
            self.generate_stream(request).await.map(Generation::Streaming)
        } else {
            self.generate_text(request).await.map(Generation::Complete)
        }
    }

    /// Blocking mode: one round trip, returns the trimmed `response` text.
    ///
    /// The request is sent with `stream: false` whatever its own flag says.
    /// Either the whole answer comes back or an error does; a successful
    /// empty answer is `Ok("")`.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request)))]
    pub async fn generate_text(&self, request: GenerateRequest) -> Result<String> {
        #[cfg(feature = "metrics")]
        counter!("stockdash.generate_requests_total", "type" => "blocking").increment(1);

        let request = self.http_request(&request, false)?;
        let response = self.transport.send_http_request(request).await?;

        match response.body {
            Some(bytes) => Ok(GenerateResponse::from_bytes(bytes)?.response.trim().to_string()),
            None => Err(Error::Protocol("Missing response body".into())),
        }
    }

    /// Streaming mode: opens the connection and returns the fragments lazily.
    ///
    /// The request is sent with `stream: true` whatever its own flag says.
    /// Connection and status failures are returned here; failures after the
    /// connection is established end the stream with an error item.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request)))]
    pub async fn generate_stream(&self, request: GenerateRequest) -> Result<FragmentStream> {
        #[cfg(feature = "metrics")]
        counter!("stockdash.generate_requests_total", "type" => "streaming").increment(1);

        let request = self.http_request(&request, true)?;
        let byte_stream = self.transport.send_http_stream_request(request).await?;
        Ok(FragmentStream::new(byte_stream))
    }

    /// Runs `request` and returns the full answer, reporting progress.
    ///
    /// In streaming mode `on_update` receives the accumulated answer after
    /// every fragment; in blocking mode it is called once with the complete
    /// answer. If the stream fails midway, `on_update` has already seen the
    /// partial text and the error is returned.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request, on_update)))]
    pub async fn ask<F>(&self, request: GenerateRequest, mut on_update: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        match self.generate(request).await? {
            Generation::Complete(answer) => {
                on_update(&answer);
                Ok(answer)
            }
            Generation::Streaming(mut fragments) => {
                let mut answer = String::new();
                while let Some(fragment) = fragments.next().await {
                    answer.push_str(&fragment?);
                    on_update(&answer);
                }
                #[cfg(feature = "tracing")]
                {
                    if fragments.skipped() > 0 {
                        tracing::debug!(
                            skipped = fragments.skipped(),
                            "stream finished with skipped chunks"
                        );
                    }
                }
                Ok(answer)
            }
        }
    }

    /// Shared by both modes so the payload shape cannot diverge.
    fn http_request(&self, request: &GenerateRequest, stream: bool) -> Result<HttpRequest> {
        let mut payload = request.payload(&self.default_model);
        payload.stream = stream;
        HttpRequest::new(GENERATE_PATH).body(payload)
    }
}
