//! `cropflow ask` — run one advisory query end to end.

use crate::advisor::default_registry;
use cropflow_config::{AppConfig, WorkflowLibrary};
use cropflow_core::{LlmClient, Query, QueryContext, ResponseStyle};
use cropflow_orchestrator::{HeuristicSelector, LlmSelector, Orchestrator, SelectorStack};
use cropflow_providers::OpenAiCompatClient;
use cropflow_telemetry::UsageMeter;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub async fn run(
    text: String,
    crop: Option<String>,
    location: Option<String>,
    plain: bool,
    no_llm: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let client: Option<Arc<dyn LlmClient>> = match OpenAiCompatClient::from_settings(&config.llm) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            info!(reason = %e, "Running without an LLM backend");
            None
        }
    };

    let meter = Arc::new(UsageMeter::new());
    let workflows = Arc::new(WorkflowLibrary::from_config(&config.workflows));
    let registry = Arc::new(default_registry(client.clone(), &config.llm.model));

    let mut stack = SelectorStack::new(workflows.clone());
    if config.selector.llm_enabled && !no_llm {
        if let Some(client) = client {
            stack = stack.with_stage(Arc::new(LlmSelector::new(
                client,
                meter.clone(),
                &config.llm.model,
                config.selector.max_agents,
            )));
        }
    }
    stack = stack.with_stage(Arc::new(HeuristicSelector::new(workflows)));

    let orchestrator = Orchestrator::new(
        registry,
        Arc::new(stack),
        meter.clone(),
        Duration::from_secs(config.dispatch.agent_timeout_secs),
    );

    let query = Query::with_context(
        text,
        QueryContext {
            crop,
            location,
            style: if plain {
                ResponseStyle::Plain
            } else {
                ResponseStyle::Conversational
            },
            ..Default::default()
        },
    );

    let result = orchestrator.process_query(query).await;

    println!("{}", result.response);

    if verbose && !result.agent_responses.is_empty() {
        println!();
        println!("── Agent outcomes ──");
        for slot in &result.agent_responses {
            let status = if slot.success {
                "ok".to_string()
            } else if slot.timed_out {
                "timeout".to_string()
            } else {
                format!("failed: {}", slot.error.as_deref().unwrap_or("unknown"))
            };
            println!(
                "  {:<26} {:>6}ms  {}",
                slot.agent,
                slot.latency.as_millis(),
                status
            );
        }
        let snap = meter.snapshot();
        println!(
            "  {} selector call(s), {} agent call(s), {:.0}ms mean latency",
            snap.selector_calls,
            snap.agent_calls,
            snap.mean_latency_ms()
        );
    }

    Ok(())
}
