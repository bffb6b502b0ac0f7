use crate::Result;
use bytes::Bytes;
use serde::Serialize;

/// A transport-agnostic POST request.
///
/// `url` is the endpoint path; transports append it to their base URL, so a
/// base with a path prefix keeps that prefix.
#[derive(Default, Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct HttpResponse {
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn body<T: Serialize>(mut self, body: T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}
