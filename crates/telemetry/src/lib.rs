//! Thread-safe usage metering — records one event per LLM or agent call
//! with latency and outcome, and serves aggregate snapshots to
//! observability tooling.
//!
//! The meter is injected explicitly wherever it is needed (never a
//! global), and is safe under concurrent recording from multiple
//! requests and multiple in-flight agent calls within one request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// What kind of call an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// The adaptive selector's prompt to the LLM.
    SelectorCall,
    /// An advisory agent invocation.
    AgentCall,
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelectorCall => write!(f, "selector_call"),
            Self::AgentCall => write!(f, "agent_call"),
        }
    }
}

/// How a call settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    /// Completed and produced a usable result.
    Ok,
    /// Completed but the reply could not be parsed.
    ParseError,
    /// Failed outright.
    Error,
    /// Exceeded its deadline.
    Timeout,
}

/// One recorded call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    pub kind: CallKind,
    pub outcome: CallOutcome,
    /// Wall-clock latency of the call in milliseconds.
    pub latency_ms: u64,
    /// When the call settled.
    pub at: DateTime<Utc>,
    /// Optional label (model name, agent name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl UsageEvent {
    pub fn new(kind: CallKind, outcome: CallOutcome, latency_ms: u64) -> Self {
        Self {
            kind,
            outcome,
            latency_ms,
            at: Utc::now(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Aggregate view over everything the meter has recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub selector_calls: u64,
    pub agent_calls: u64,
    pub ok: u64,
    pub parse_errors: u64,
    pub errors: u64,
    pub timeouts: u64,
    pub total_latency_ms: u64,
}

impl UsageSnapshot {
    /// Mean latency across all recorded calls, in milliseconds.
    pub fn mean_latency_ms(&self) -> f64 {
        let total = self.selector_calls + self.agent_calls;
        if total == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / total as f64
        }
    }
}

/// The usage meter.
///
/// Keeps a bounded in-memory event buffer (oldest events pruned first)
/// plus running totals for cheap snapshots.
pub struct UsageMeter {
    events: RwLock<Vec<UsageEvent>>,
    totals: RwLock<UsageSnapshot>,
    capacity: usize,
}

const DEFAULT_CAPACITY: usize = 5_000;

impl UsageMeter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a meter with a custom event buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            totals: RwLock::new(UsageSnapshot::default()),
            capacity: capacity.max(1),
        }
    }

    /// Record one settled call.
    pub fn record(&self, event: UsageEvent) {
        {
            let mut totals = self.totals.write().expect("usage meter lock poisoned");
            match event.kind {
                CallKind::SelectorCall => totals.selector_calls += 1,
                CallKind::AgentCall => totals.agent_calls += 1,
            }
            match event.outcome {
                CallOutcome::Ok => totals.ok += 1,
                CallOutcome::ParseError => totals.parse_errors += 1,
                CallOutcome::Error => totals.errors += 1,
                CallOutcome::Timeout => totals.timeouts += 1,
            }
            totals.total_latency_ms += event.latency_ms;
        }

        let mut events = self.events.write().expect("usage meter lock poisoned");
        if events.len() >= self.capacity {
            let drain = (self.capacity / 10 + 1).min(events.len());
            events.drain(..drain);
        }
        events.push(event);
    }

    /// Aggregate totals since meter creation.
    pub fn snapshot(&self) -> UsageSnapshot {
        self.totals.read().expect("usage meter lock poisoned").clone()
    }

    /// The most recent events, newest last.
    pub fn recent(&self, limit: usize) -> Vec<UsageEvent> {
        let events = self.events.read().expect("usage meter lock poisoned");
        let start = events.len().saturating_sub(limit);
        events[start..].to_vec()
    }
}

impl Default for UsageMeter {
    fn default() -> Self {
        Self::new()
    }
}
