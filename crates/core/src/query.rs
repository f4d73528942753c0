//! The farmer query and its request-scoped context.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single free-text query plus surrounding context.
///
/// Created fresh per request and discarded after the response is
/// returned — it carries no identity beyond the request itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// The raw query text as typed by the farmer.
    pub text: String,

    /// Request context (location, crop, session, rendering style).
    #[serde(default)]
    pub context: QueryContext,
}

impl Query {
    /// Create a query with an empty context.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: QueryContext::default(),
        }
    }

    /// Create a query with the given context.
    pub fn with_context(text: impl Into<String>, context: QueryContext) -> Self {
        Self {
            text: text.into(),
            context,
        }
    }

    /// The query text trimmed and lower-cased, the form every matching
    /// stage (classifier, heuristic selector) operates on.
    pub fn normalized_text(&self) -> String {
        self.text.trim().to_lowercase()
    }
}

/// Context accompanying a query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryContext {
    /// Free-text location (e.g. "Gujarat", "Nashik district").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// The crop under discussion, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,

    /// Opaque session identifier, passed through for logging only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// How the final response should be rendered.
    #[serde(default)]
    pub style: ResponseStyle,

    /// Free-form extras forwarded to agents untouched.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Rendering style for the final user-facing text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStyle {
    /// Decorated section headers, friendlier tone (default).
    #[default]
    Conversational,
    /// Bare headers, no decoration.
    Plain,
}
