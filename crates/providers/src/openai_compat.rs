//! OpenAI-compatible LLM backend.
//!
//! Works with: OpenAI, OpenRouter, Gemini (OpenAI-compat endpoint),
//! Ollama, vLLM, Together AI, and any other endpoint exposing the
//! `/v1/chat/completions` shape.

use async_trait::async_trait;
use cropflow_config::LlmSettings;
use cropflow_core::error::LlmError;
use cropflow_core::llm::{LlmClient, LlmRequest, LlmResponse};
use serde::Deserialize;
use tracing::{debug, warn};

/// An OpenAI-compatible chat-completions client.
///
/// Single-prompt requests only: the selector and the demo advisors send
/// one user message per call, so there is no conversation state here.
#[derive(Debug)]
pub struct OpenAiCompatClient {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Create a new OpenAI-compatible client.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create an OpenAI client (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Create an OpenRouter client (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key)
    }

    /// Create an Ollama client (convenience constructor).
    pub fn ollama(base_url: Option<&str>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
        )
    }

    /// Build a client from loaded settings.
    ///
    /// Returns `NotConfigured` when the LLM section is disabled or no
    /// API key is present, so callers can degrade to offline mode.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        if !settings.enabled {
            return Err(LlmError::NotConfigured(
                "llm.enabled is false in configuration".into(),
            ));
        }
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| LlmError::NotConfigured("no API key configured".into()))?;

        Ok(Self::new(
            settings.provider.clone(),
            settings.api_url.clone(),
            api_key,
        ))
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": request.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(backend = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(e.to_string())
                } else {
                    LlmError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(LlmError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(LlmError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "LLM backend returned error");
            return Err(LlmError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| LlmError::ApiError {
            status_code: 200,
            message: format!("Failed to parse response: {e}"),
        })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        Ok(LlmResponse {
            text: choice.message.content.unwrap_or_default(),
            model: api_response.model,
        })
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_constructor() {
        let client = OpenAiCompatClient::openai("sk-test");
        assert_eq!(client.name(), "openai");
        assert!(client.base_url.contains("api.openai.com"));
    }

    #[test]
    fn ollama_constructor() {
        let client = OpenAiCompatClient::ollama(None);
        assert_eq!(client.name(), "ollama");
        assert!(client.base_url.contains("localhost:11434"));
    }

    #[test]
    fn trailing_slash_trimmed_from_base_url() {
        let client = OpenAiCompatClient::new("test", "https://example.com/v1/", "key");
        assert_eq!(client.base_url, "https://example.com/v1");
    }

    #[test]
    fn from_settings_rejects_disabled() {
        let settings = LlmSettings::default();
        let err = OpenAiCompatClient::from_settings(&settings).unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[test]
    fn from_settings_rejects_missing_key() {
        let settings = LlmSettings {
            enabled: true,
            ..LlmSettings::default()
        };
        let err = OpenAiCompatClient::from_settings(&settings).unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[test]
    fn from_settings_builds_client() {
        let settings = LlmSettings {
            enabled: true,
            api_key: Some("sk-test".into()),
            ..LlmSettings::default()
        };
        let client = OpenAiCompatClient::from_settings(&settings).unwrap();
        assert_eq!(client.name(), "openai_compat");
    }

    #[test]
    fn parse_completion_response() {
        let data = r#"{
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": "hello"}}]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.model, "gpt-4o-mini");
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hello"));
    }

    #[test]
    fn parse_null_content() {
        let data = r#"{
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
