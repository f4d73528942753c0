//! LlmClient trait — the abstraction over LLM backends.
//!
//! The orchestrator uses an LLM in exactly one place (the adaptive
//! selection stage); demo advisors reuse the same seam. Implementations
//! live in `cropflow-providers`; tests use scripted stubs.

use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single-prompt completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// The model to use (e.g. "gemini-2.0-flash", "gpt-4o-mini").
    pub model: String,

    /// The full prompt text.
    pub prompt: String,

    /// Temperature (0.0 = deterministic).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.2
}

impl LlmRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

/// A completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text.
    pub text: String,

    /// Which model actually responded (may differ from requested).
    pub model: String,
}

/// The LLM backend seam.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// A human-readable backend name (e.g. "openai_compat").
    fn name(&self) -> &str;

    /// Send a prompt and get the completion text back.
    async fn complete(&self, request: LlmRequest) -> std::result::Result<LlmResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_to_low_temperature() {
        let req = LlmRequest::new("test-model", "hello");
        assert!((req.temperature - 0.2).abs() < f32::EPSILON);
        assert!(req.max_tokens.is_none());
    }
}
