//! Core of the stock dashboard: a client for a locally running Ollama server
//! that generates market commentary either in one blocking call or as a
//! stream of text fragments, plus the market-data types the dashboard feeds
//! into it.

use std::sync::Arc;

use thiserror::Error;

use self::transport::Transport;

pub mod builder;
pub mod client;
pub mod config;
pub mod market;
pub mod parser;
pub mod stream;
pub mod transport;
pub mod types;

/// Client for the `/api/generate` endpoint of a local Ollama server.
///
/// Holds no per-request state; cloning is cheap and every call is independent.
#[derive(Clone)]
pub struct InferenceClient {
    transport: Arc<dyn Transport + Send + Sync>,
    default_model: String,
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Client error: {0}")]
    Client(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Returns `true` when the failure happened on the network: connection
    /// refused, DNS, timeout, or an interrupted body.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
