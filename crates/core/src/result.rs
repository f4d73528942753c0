//! Per-agent invocation results and the final orchestration outcome.

use crate::agent::AgentId;
use crate::error::AgentError;
use crate::report::AgentReport;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The settled outcome of one agent invocation.
///
/// Exactly one of these is produced per selected agent per request,
/// whether the agent succeeded, failed, or timed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInvocationResult {
    /// Which agent this slot belongs to.
    pub agent: AgentId,

    /// Whether the invocation produced a usable report.
    pub success: bool,

    /// The report, present only on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<AgentReport>,

    /// Failure description, present only on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Whether the failure was a per-agent timeout.
    #[serde(default)]
    pub timed_out: bool,

    /// Wall-clock time spent inside this invocation.
    pub latency: Duration,
}

impl AgentInvocationResult {
    /// A successful slot.
    pub fn ok(agent: AgentId, report: AgentReport, latency: Duration) -> Self {
        Self {
            agent,
            success: true,
            report: Some(report),
            error: None,
            timed_out: false,
            latency,
        }
    }

    /// A failed slot.
    pub fn failed(agent: AgentId, error: impl Into<String>, latency: Duration) -> Self {
        Self {
            agent,
            success: false,
            report: None,
            error: Some(error.into()),
            timed_out: false,
            latency,
        }
    }

    /// A timed-out slot.
    pub fn timeout(agent: AgentId, timeout: Duration) -> Self {
        let error = AgentError::Timeout {
            agent: agent.as_str().to_string(),
            timeout_secs: timeout.as_secs(),
        };
        Self {
            agent,
            success: false,
            report: None,
            error: Some(error.to_string()),
            timed_out: true,
            latency: timeout,
        }
    }
}

/// The final structured outcome of one `process_query` call.
///
/// Always returned, even under partial or total agent failure. `success`
/// is false only when an error escaped every containment boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// False only for a truly unanticipated fault.
    pub success: bool,

    /// The rendered, user-facing response text. Never empty.
    pub response: String,

    /// One settled result per selected agent, in invocation order.
    #[serde(default)]
    pub agent_responses: Vec<AgentInvocationResult>,

    /// Agents that contributed to the merged answer.
    #[serde(default)]
    pub agents_used: Vec<AgentId>,

    /// Total wall-clock time for the whole call.
    pub execution_time: Duration,
}
