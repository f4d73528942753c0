//! Concurrent fan-out of selected agents with join-all semantics.
//!
//! Each invocation runs in its own spawned task behind its own failure
//! boundary: handler errors, timeouts, and panics are all contained to
//! that agent's result slot. The batch settles only when every slot has
//! settled; output preserves input order and length exactly.

use cropflow_core::{AgentInvocationResult, AgentRegistry, Query, SelectionDecision};
use cropflow_telemetry::{CallKind, CallOutcome, UsageEvent, UsageMeter};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Fan-out/join-all dispatcher.
pub struct Dispatcher {
    agent_timeout: Duration,
    meter: Arc<UsageMeter>,
}

impl Dispatcher {
    pub fn new(agent_timeout: Duration, meter: Arc<UsageMeter>) -> Self {
        Self {
            agent_timeout,
            meter,
        }
    }

    /// Invoke every agent in the decision concurrently.
    ///
    /// Returns one settled result per selected agent, in selection
    /// order, plus the wall-clock time of the whole batch (measured
    /// once, not summed per agent). No retries, no early exit.
    pub async fn dispatch(
        &self,
        registry: &Arc<AgentRegistry>,
        decision: &SelectionDecision,
        query: &Query,
    ) -> (Vec<AgentInvocationResult>, Duration) {
        let started = Instant::now();

        let tasks: Vec<_> = decision
            .agents
            .iter()
            .map(|&agent| {
                let handler = registry.handler(agent);
                let query = query.clone();
                let timeout = self.agent_timeout;

                tokio::spawn(async move {
                    let Some(handler) = handler else {
                        return AgentInvocationResult::failed(
                            agent,
                            "agent not registered",
                            Duration::ZERO,
                        );
                    };

                    let call_started = Instant::now();
                    match tokio::time::timeout(timeout, handler.handle(&query)).await {
                        Ok(Ok(report)) => {
                            AgentInvocationResult::ok(agent, report, call_started.elapsed())
                        }
                        Ok(Err(e)) => {
                            AgentInvocationResult::failed(agent, e.to_string(), call_started.elapsed())
                        }
                        Err(_) => AgentInvocationResult::timeout(agent, timeout),
                    }
                })
            })
            .collect();

        let joined = join_all(tasks).await;

        let mut results = Vec::with_capacity(decision.len());
        for (join_result, &agent) in joined.into_iter().zip(&decision.agents) {
            let slot = match join_result {
                Ok(slot) => slot,
                Err(e) => {
                    // A panicking handler loses only its own slot.
                    warn!(%agent, error = %e, "Agent task panicked");
                    AgentInvocationResult::failed(
                        agent,
                        format!("agent task panicked: {e}"),
                        started.elapsed(),
                    )
                }
            };

            let outcome = if slot.success {
                CallOutcome::Ok
            } else if slot.timed_out {
                CallOutcome::Timeout
            } else {
                CallOutcome::Error
            };
            self.meter.record(
                UsageEvent::new(CallKind::AgentCall, outcome, slot.latency.as_millis() as u64)
                    .with_label(agent.as_str()),
            );
            debug!(
                %agent,
                success = slot.success,
                timed_out = slot.timed_out,
                latency_ms = slot.latency.as_millis() as u64,
                "Agent invocation settled"
            );
            results.push(slot);
        }

        (results, started.elapsed())
    }
}
