//! # CropFlow Orchestrator
//!
//! Routes one free-text farmer query through the advisory pipeline:
//!
//! ```text
//! query ──▶ QueryClassifier ──(simple)──▶ canned reply
//!              │
//!              ▼
//!        SelectorStack (adaptive ──▶ heuristic ──▶ default plan)
//!              │
//!              ▼
//!          Dispatcher (concurrent fan-out, join-all)
//!              │
//!              ▼
//!      ResponseAggregator ──▶ NaturalLanguageFormatter ──▶ text
//! ```
//!
//! Partial failure is the normal case: a request with failing or
//! timed-out agents still completes with `success = true` and the best
//! answer the surviving agents could produce.

pub mod aggregator;
pub mod classifier;
pub mod dispatcher;
pub mod formatter;
pub mod heuristic;
pub mod llm_selector;
pub mod stack;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::{AggregatedDocument, MergedItem, ResponseAggregator};
pub use classifier::QueryClassifier;
pub use dispatcher::Dispatcher;
pub use formatter::{NaturalLanguageFormatter, CLARIFYING_RESPONSE};
pub use heuristic::HeuristicSelector;
pub use llm_selector::LlmSelector;
pub use stack::SelectorStack;

use cropflow_core::{AgentRegistry, OrchestrationResult, Query, Result, Selector};
use cropflow_telemetry::UsageMeter;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

const APOLOGY_PREFIX: &str = "I apologize, but I encountered an error while processing your query";

/// The orchestration entry point.
///
/// Shared read-only across requests: clone the `Arc`s and call
/// [`process_query`](Orchestrator::process_query) from as many tasks as
/// you like.
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    selector: Arc<dyn Selector>,
    dispatcher: Dispatcher,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<AgentRegistry>,
        selector: Arc<dyn Selector>,
        meter: Arc<UsageMeter>,
        agent_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            selector,
            dispatcher: Dispatcher::new(agent_timeout, meter),
        }
    }

    /// Process one query end to end.
    ///
    /// Always returns a well-formed result. `success` is false only when
    /// an error escaped every containment boundary; agent failures and
    /// selection fallbacks are contained and still produce `success =
    /// true` with best-effort text.
    pub async fn process_query(&self, query: Query) -> OrchestrationResult {
        let started = Instant::now();

        // Trivial conversational input skips the whole pipeline.
        if QueryClassifier::is_simple(&query.text) {
            info!(session = ?query.context.session_id, "Simple query short-circuited");
            return OrchestrationResult {
                success: true,
                response: QueryClassifier::simple_response(&query.text),
                agent_responses: Vec::new(),
                agents_used: Vec::new(),
                execution_time: started.elapsed(),
            };
        }

        match self.run_pipeline(&query).await {
            Ok(mut result) => {
                result.execution_time = started.elapsed();
                info!(
                    success = result.success,
                    agents = result.agent_responses.len(),
                    contributors = result.agents_used.len(),
                    elapsed_ms = result.execution_time.as_millis() as u64,
                    "Query processed"
                );
                result
            }
            Err(e) => {
                error!(error = %e, "Orchestration fault escaped containment");
                OrchestrationResult {
                    success: false,
                    response: format!("{APOLOGY_PREFIX}: {e}"),
                    agent_responses: Vec::new(),
                    agents_used: Vec::new(),
                    execution_time: started.elapsed(),
                }
            }
        }
    }

    async fn run_pipeline(&self, query: &Query) -> Result<OrchestrationResult> {
        let decision = self.selector.select(query, &self.registry).await?;
        info!(
            source = %decision.source,
            agents = ?decision.agents,
            "Agents selected"
        );

        let (agent_responses, _batch_elapsed) = self
            .dispatcher
            .dispatch(&self.registry, &decision, query)
            .await;

        let document = ResponseAggregator::merge(&agent_responses);
        let response = NaturalLanguageFormatter::render(&document, query.context.style);

        Ok(OrchestrationResult {
            success: true,
            response,
            agents_used: document.contributors,
            agent_responses,
            // Overwritten by the caller with the full wall-clock time.
            execution_time: Duration::ZERO,
        })
    }
}
