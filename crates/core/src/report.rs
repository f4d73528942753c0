//! The structured partial answer an agent returns.
//!
//! Agents are external collaborators; their payloads are parsed
//! defensively. Missing keys mean absent sections, never errors.

use crate::error::AgentError;
use serde::{Deserialize, Serialize};

/// A structured partial answer from one advisory agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentReport {
    /// The agent's prose answer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// Ordered list of recommended actions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,

    /// Ordered list of warnings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Ordered list of concrete next steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,

    /// Free-form payload the agent wants to surface to callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl AgentReport {
    /// Build a report with just an answer.
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            answer: Some(text.into()),
            ..Self::default()
        }
    }

    /// Whether the report carries no content at all.
    pub fn is_empty(&self) -> bool {
        self.answer.as_deref().is_none_or(|a| a.trim().is_empty())
            && self.recommendations.is_empty()
            && self.warnings.is_empty()
            && self.next_steps.is_empty()
            && self.data.is_none()
    }

    /// Parse an arbitrary JSON document into a report.
    ///
    /// Recognized keys: `success`, `answer`/`response`, `recommendations`,
    /// `warnings`, `next_steps`, `data`. Anything else is ignored. A
    /// `success: false` payload is the agent declaring its own failure and
    /// maps to [`AgentError::Failed`]; every other shape — including a
    /// bare string or an empty object — yields a (possibly empty) report.
    pub fn from_value(
        agent: &str,
        value: serde_json::Value,
    ) -> std::result::Result<Self, AgentError> {
        match value {
            serde_json::Value::String(s) => Ok(Self::answer(s)),
            serde_json::Value::Object(map) => {
                if map.get("success").and_then(|v| v.as_bool()) == Some(false) {
                    let reason = map
                        .get("error")
                        .and_then(|v| v.as_str())
                        .unwrap_or("agent reported failure")
                        .to_string();
                    return Err(AgentError::Failed {
                        agent: agent.to_string(),
                        reason,
                    });
                }

                let answer = map
                    .get("answer")
                    .or_else(|| map.get("response"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string);

                Ok(Self {
                    answer,
                    recommendations: string_list(map.get("recommendations")),
                    warnings: string_list(map.get("warnings")),
                    next_steps: string_list(map.get("next_steps")),
                    data: map.get("data").cloned(),
                })
            }
            other => Err(AgentError::MalformedPayload(format!(
                "expected object or string, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Extract an ordered list of non-empty strings; non-string items are
/// dropped rather than failing the whole payload.
fn string_list(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_payload() {
        let report = AgentReport::from_value(
            "soil_health",
            json!({
                "success": true,
                "answer": "Your soil is slightly alkaline.",
                "recommendations": ["Add gypsum", "Test again in 3 months"],
                "warnings": ["Salinity trending up"],
                "next_steps": ["Collect a fresh sample"],
                "data": {"ph": 8.1}
            }),
        )
        .unwrap();

        assert_eq!(report.answer.as_deref(), Some("Your soil is slightly alkaline."));
        assert_eq!(report.recommendations.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.next_steps.len(), 1);
        assert!(report.data.is_some());
    }

    #[test]
    fn response_key_is_an_alias_for_answer() {
        let report =
            AgentReport::from_value("x", json!({"response": "Rain expected Friday."})).unwrap();
        assert_eq!(report.answer.as_deref(), Some("Rain expected Friday."));
    }

    #[test]
    fn missing_keys_are_absent_sections() {
        let report = AgentReport::from_value("x", json!({})).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn declared_failure_becomes_error() {
        let err = AgentReport::from_value(
            "market_intelligence",
            json!({"success": false, "error": "price feed unavailable"}),
        )
        .unwrap_err();
        match err {
            AgentError::Failed { agent, reason } => {
                assert_eq!(agent, "market_intelligence");
                assert!(reason.contains("price feed"));
            }
            other => panic!("Expected Failed, got: {other:?}"),
        }
    }

    #[test]
    fn bare_string_payload_is_an_answer() {
        let report = AgentReport::from_value("x", json!("Sow before mid November.")).unwrap();
        assert_eq!(report.answer.as_deref(), Some("Sow before mid November."));
    }

    #[test]
    fn scalar_payload_is_malformed() {
        let err = AgentReport::from_value("x", json!(42)).unwrap_err();
        assert!(matches!(err, AgentError::MalformedPayload(_)));
    }

    #[test]
    fn non_string_list_items_are_dropped() {
        let report = AgentReport::from_value(
            "x",
            json!({"recommendations": ["Mulch the beds", 7, null, "  "]}),
        )
        .unwrap();
        assert_eq!(report.recommendations, vec!["Mulch the beds"]);
    }
}
