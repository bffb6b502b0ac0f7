//! Endpoint configuration for [`InferenceClient`](crate::InferenceClient).

use std::time::Duration;

/// Base address of the local Ollama server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "deepseek-r1";

/// Connect/read timeout, and total timeout for blocking requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how the client reaches the inference server.
///
/// Passed explicitly to [`InferenceClientBuilder::config`](crate::builder::InferenceClientBuilder::config);
/// nothing in the client reads global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub model: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl EndpointConfig {
    /// Builds a configuration from the process environment.
    ///
    /// - `OLLAMA_URL`, then `OLLAMA_HOST`, for the base address.
    /// - `OLLAMA_MODEL` for the default model.
    /// - `OLLAMA_TIMEOUT_SECS` for the timeout in whole seconds.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("OLLAMA_URL").or_else(|| lookup("OLLAMA_HOST")) {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                config.base_url = url.to_string();
            }
        }

        if let Some(model) = lookup("OLLAMA_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }

        if let Some(secs) = lookup("OLLAMA_TIMEOUT_SECS").and_then(|s| s.trim().parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_server() {
        let config = EndpointConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, EndpointConfig::default());
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.model, "deepseek-r1");
    }

    #[test]
    fn ollama_url_wins_over_host_and_loses_trailing_slash() {
        let config = EndpointConfig::from_lookup(lookup_from(&[
            ("OLLAMA_URL", "http://gpu-box:11434/"),
            ("OLLAMA_HOST", "http://other:1"),
        ]));
        assert_eq!(config.base_url, "http://gpu-box:11434");
    }

    #[test]
    fn host_is_used_when_url_is_missing() {
        let config = EndpointConfig::from_lookup(lookup_from(&[("OLLAMA_HOST", "http://other:1")]));
        assert_eq!(config.base_url, "http://other:1");
    }

    #[test]
    fn bad_timeout_keeps_default() {
        let config = EndpointConfig::from_lookup(lookup_from(&[
            ("OLLAMA_TIMEOUT_SECS", "soon"),
            ("OLLAMA_MODEL", "mistral"),
        ]));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.model, "mistral");

        let config = EndpointConfig::from_lookup(lookup_from(&[("OLLAMA_TIMEOUT_SECS", "5")]));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
