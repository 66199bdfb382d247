//! Client configuration.
//!
//! Built once, handed to `SudokuClient::new`, never mutated afterwards. The
//! core reads no environment variables; embedding applications deserialize
//! this from whatever config source they already use.

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static token used when a call does not supply its own.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Extra headers sent with every request, after the JSON defaults.
    #[serde(default)]
    pub default_headers: Vec<(String, String)>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_token: None,
            default_headers: Vec::new(),
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Base URL with every trailing slash removed.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        let config = ClientConfig::new("http://localhost:5000///");
        assert_eq!(config.normalized_base_url(), "http://localhost:5000");
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());

        let config: ClientConfig = serde_json::from_str(
            r#"{"baseUrl":"https://api.example.com/","apiToken":"secret"}"#,
        )
        .unwrap();
        assert_eq!(config.normalized_base_url(), "https://api.example.com");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
    }
}
