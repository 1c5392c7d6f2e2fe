//! Gemini `generateContent` client over synchronous HTTP

use std::time::Duration;

use serde_json::{json, Value};

use super::{LanguageModel, ProviderError};
use crate::config::ProviderConfig;

pub struct GeminiClient {
    agent: ureq::Agent,
    url: String,
    api_key: String,
    user_agent: String,
}

impl GeminiClient {
    pub fn new(config: &ProviderConfig, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey {
                env_var: config.api_key_env.clone(),
            });
        }

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            agent,
            url: format!(
                "{}/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key,
            user_agent: format!(
                "vaultsift/{} ({})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ),
        })
    }

    /// Resolve the key from an explicit value or the configured env var
    pub fn from_env(config: &ProviderConfig, explicit: Option<&str>) -> Result<Self, ProviderError> {
        let key = explicit
            .map(str::to_string)
            .or_else(|| std::env::var(&config.api_key_env).ok())
            .unwrap_or_default();
        Self::new(config, key)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn classify_status(status: u16, body: String) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited,
        500 | 502 | 503 | 504 => ProviderError::Unavailable { status },
        _ => ProviderError::Rejected { status, body },
    }
}

fn classify_transport(error: ureq::Error) -> ProviderError {
    match error {
        ureq::Error::StatusCode(status) => classify_status(status, String::new()),
        other => ProviderError::Transport(other.to_string()),
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(envelope: &Value) -> Result<String, ProviderError> {
    let parts = envelope
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::MalformedEnvelope("no candidate parts".to_string()))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(ProviderError::MalformedEnvelope("empty candidate text".to_string()));
    }
    Ok(text)
}

impl LanguageModel for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let payload = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": 0.2 }
        })
        .to_string();

        let mut response = self
            .agent
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("User-Agent", &self.user_agent)
            .header("x-goog-api-key", &self.api_key)
            .send(payload.as_str())
            .map_err(classify_transport)?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(classify_transport)?;

        if !(200..300).contains(&status) {
            tracing::debug!(status, "provider returned error status");
            return Err(classify_status(status, body));
        }

        let envelope: Value = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedEnvelope(e.to_string()))?;
        extract_text(&envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> ProviderConfig {
        ProviderConfig {
            endpoint: endpoint.to_string(),
            model: "test-model".to_string(),
            ..ProviderConfig::default()
        }
    }

    const PATH: &str = "/models/test-model:generateContent";

    #[test]
    fn test_missing_key() {
        let err = GeminiClient::new(&config("http://localhost"), "  ").err().unwrap();
        assert!(matches!(err, ProviderError::MissingApiKey { .. }));
    }

    #[test]
    fn test_url_shape() {
        let client = GeminiClient::new(&config("https://example.com/v1beta/"), "k").unwrap();
        assert_eq!(
            client.url(),
            "https://example.com/v1beta/models/test-model:generateContent"
        );
    }

    #[test]
    fn test_generate_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"hello "},{"text":"world"}]}}]}"#)
            .create();

        let client = GeminiClient::new(&config(&server.url()), "secret").unwrap();
        assert_eq!(client.generate("hi").unwrap(), "hello world");
        mock.assert();
    }

    #[test]
    fn test_status_classification() {
        let mut server = mockito::Server::new();
        let client = GeminiClient::new(&config(&server.url()), "k").unwrap();

        let m = server.mock("POST", PATH).with_status(429).create();
        assert_eq!(client.generate("x").unwrap_err(), ProviderError::RateLimited);
        m.remove();

        let m = server.mock("POST", PATH).with_status(503).create();
        assert_eq!(
            client.generate("x").unwrap_err(),
            ProviderError::Unavailable { status: 503 }
        );
        m.remove();

        let m = server
            .mock("POST", PATH)
            .with_status(400)
            .with_body("bad")
            .create();
        let err = client.generate("x").unwrap_err();
        assert!(!err.is_transient());
        assert!(matches!(err, ProviderError::Rejected { status: 400, .. }));
        m.remove();
    }

    #[test]
    fn test_malformed_envelope() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
            .create();
        let client = GeminiClient::new(&config(&server.url()), "k").unwrap();
        assert!(matches!(
            client.generate("x").unwrap_err(),
            ProviderError::MalformedEnvelope(_)
        ));
    }
}
