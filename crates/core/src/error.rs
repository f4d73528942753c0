//! Error types for the CropFlow domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. Agent invocation
//! failures never cross the dispatcher boundary as errors — they are
//! carried as failed result slots — but the handler-facing [`AgentError`]
//! type lives here so agents have one contract to return.

use thiserror::Error;

/// The top-level error type for all CropFlow operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Selection errors ---
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    // --- LLM backend errors ---
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    // --- Agent handler errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of a selection stage. All variants are non-fatal: the
/// selector stack reacts by falling through to the next stage.
#[derive(Debug, Clone, Error)]
pub enum SelectionError {
    #[error("Selector reply was not a JSON array of agent names: {0}")]
    ParseFailed(String),

    #[error("No agents matched the query")]
    NoMatch,

    #[error("Selection stage unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a single advisory agent invocation.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("Agent '{agent}' failed: {reason}")]
    Failed { agent: String, reason: String },

    #[error("Agent '{agent}' timed out after {timeout_secs}s")]
    Timeout { agent: String, timeout_secs: u64 },

    #[error("Agent returned a malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),
}

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_error_displays_correctly() {
        let err = Error::Selection(SelectionError::ParseFailed("got an object".into()));
        assert!(err.to_string().contains("JSON array"));
        assert!(err.to_string().contains("got an object"));
    }

    #[test]
    fn agent_timeout_displays_correctly() {
        let err = AgentError::Timeout {
            agent: "weather_watcher".into(),
            timeout_secs: 30,
        };
        assert!(err.to_string().contains("weather_watcher"));
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn llm_error_converts_to_top_level() {
        let err: Error = LlmError::RateLimited {
            retry_after_secs: 5,
        }
        .into();
        assert!(matches!(err, Error::Llm(_)));
    }
}
