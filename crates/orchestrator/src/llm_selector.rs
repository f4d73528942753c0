//! The LLM-backed adaptive selection stage.
//!
//! Exactly one prompt per call. The model must reply with strictly a
//! JSON array of agent names drawn from the registry; anything else is
//! a parse failure, never a partial result. Every call records one
//! usage-meter event with its latency and outcome.

use async_trait::async_trait;
use cropflow_core::{
    AgentRegistry, LlmClient, LlmError, LlmRequest, Query, SelectionDecision, SelectionError,
    SelectionSource, Selector,
};
use cropflow_telemetry::{CallKind, CallOutcome, UsageEvent, UsageMeter};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// The adaptive stage.
pub struct LlmSelector {
    client: Arc<dyn LlmClient>,
    meter: Arc<UsageMeter>,
    model: String,
    /// Cap on how many agents one decision may name.
    max_agents: usize,
}

impl LlmSelector {
    pub fn new(
        client: Arc<dyn LlmClient>,
        meter: Arc<UsageMeter>,
        model: impl Into<String>,
        max_agents: usize,
    ) -> Self {
        Self {
            client,
            meter,
            model: model.into(),
            max_agents: max_agents.max(1),
        }
    }

    fn build_prompt(&self, query: &Query, registry: &AgentRegistry) -> String {
        let agent_list: String = registry
            .descriptors()
            .iter()
            .map(|d| format!("- {}: {} ({})", d.id, d.name, d.description))
            .collect::<Vec<_>>()
            .join("\n");

        let mut context_lines = Vec::new();
        if let Some(crop) = &query.context.crop {
            context_lines.push(format!("Crop: {crop}"));
        }
        if let Some(location) = &query.context.location {
            context_lines.push(format!("Location: {location}"));
        }
        let context_text = if context_lines.is_empty() {
            "None".to_string()
        } else {
            context_lines.join("\n")
        };

        format!(
            "You are the coordinator of an agricultural advisory system. Analyze the \
             farmer's query and decide which specialist agents should handle it.\n\n\
             Available agents:\n{agent_list}\n\n\
             Farmer's query: \"{query_text}\"\n\n\
             Context:\n{context_text}\n\n\
             Select the most relevant agents (1-{max} maximum). Respond with strictly a \
             JSON array of agent names from the list above, nothing else:\n\
             [\"agent1\", \"agent2\"]",
            agent_list = agent_list,
            query_text = query.text.trim(),
            context_text = context_text,
            max = self.max_agents,
        )
    }
}

#[async_trait]
impl Selector for LlmSelector {
    fn name(&self) -> &str {
        "llm"
    }

    async fn select(
        &self,
        query: &Query,
        registry: &AgentRegistry,
    ) -> std::result::Result<SelectionDecision, SelectionError> {
        let prompt = self.build_prompt(query, registry);
        let request = LlmRequest::new(&self.model, prompt);

        let started = Instant::now();
        let reply = self.client.complete(request).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        let text = match reply {
            Ok(response) => response.text,
            Err(e) => {
                let outcome = match e {
                    LlmError::Timeout(_) => CallOutcome::Timeout,
                    _ => CallOutcome::Error,
                };
                self.meter.record(
                    UsageEvent::new(CallKind::SelectorCall, outcome, latency_ms)
                        .with_label(&self.model),
                );
                warn!(error = %e, "Adaptive stage: LLM call failed");
                return Err(SelectionError::Unavailable(e.to_string()));
            }
        };

        match parse_agent_array(&text, registry, self.max_agents) {
            Ok(agents) => {
                self.meter.record(
                    UsageEvent::new(CallKind::SelectorCall, CallOutcome::Ok, latency_ms)
                        .with_label(&self.model),
                );
                debug!(agents = agents.len(), "Adaptive stage selected agents");
                Ok(SelectionDecision::new(agents, SelectionSource::Llm))
            }
            Err(e) => {
                self.meter.record(
                    UsageEvent::new(CallKind::SelectorCall, CallOutcome::ParseError, latency_ms)
                        .with_label(&self.model),
                );
                warn!(error = %e, "Adaptive stage: unparsable selection reply");
                Err(e)
            }
        }
    }
}

/// Parse the model's reply into registered agent ids.
///
/// Accepts a fenced ```json block or the outermost `[...]` in the raw
/// text. Names not in the registry are dropped; an empty survivor list
/// is a parse failure (strict: no partial credit for a bad reply).
fn parse_agent_array(
    text: &str,
    registry: &AgentRegistry,
    max_agents: usize,
) -> std::result::Result<Vec<cropflow_core::AgentId>, SelectionError> {
    let candidate = extract_json_array(text)
        .ok_or_else(|| SelectionError::ParseFailed("no JSON array in reply".into()))?;

    let names: Vec<String> = serde_json::from_str(candidate)
        .map_err(|e| SelectionError::ParseFailed(format!("not a JSON string array: {e}")))?;

    let agents: Vec<_> = names
        .iter()
        .filter_map(|name| name.parse().ok())
        .filter(|id| registry.contains(*id))
        .take(max_agents)
        .collect();

    if agents.is_empty() {
        return Err(SelectionError::ParseFailed(format!(
            "no registered agents among: {names:?}"
        )));
    }
    Ok(agents)
}

/// Locate the JSON array payload in a possibly-chatty reply.
fn extract_json_array(text: &str) -> Option<&str> {
    let text = text.trim();

    // Fenced block first: ```json ... ``` or plain ``` ... ```
    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('[') {
                return Some(inner);
            }
        }
    }

    // Otherwise the outermost [...] span.
    let open = text.find('[')?;
    let close = text.rfind(']')?;
    if close > open {
        Some(&text[open..=close])
    } else {
        None
    }
}
