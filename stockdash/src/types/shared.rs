use serde::{Deserialize, Serialize};

/// Error body returned by Ollama alongside a non-success status.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerError {
    pub error: String,
}
