//! Agent selection: the decision type and the pluggable selector seam.

use crate::agent::{AgentId, AgentRegistry};
use crate::error::SelectionError;
use crate::query::Query;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which stage produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// Keyword/category matching.
    Heuristic,
    /// The LLM-backed adaptive stage.
    Llm,
    /// The configured default plan.
    Default,
}

impl std::fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heuristic => write!(f, "heuristic"),
            Self::Llm => write!(f, "llm"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// An ordered, deduplicated set of agents to invoke for one query.
///
/// The constructor removes duplicates keeping first occurrence; the
/// selector stack guarantees the list is never empty by falling through
/// to the default plan, erring instead when the registry holds nothing
/// to fall back on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionDecision {
    /// Agents to invoke, in invocation order.
    pub agents: Vec<AgentId>,

    /// The stage that produced this decision.
    pub source: SelectionSource,
}

impl SelectionDecision {
    /// Build a decision, deduplicating while preserving first occurrence.
    pub fn new(agents: impl IntoIterator<Item = AgentId>, source: SelectionSource) -> Self {
        let mut seen = Vec::new();
        for agent in agents {
            if !seen.contains(&agent) {
                seen.push(agent);
            }
        }
        Self {
            agents: seen,
            source,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }
}

/// A selection stage.
///
/// Concrete implementations: the heuristic keyword stage, the LLM-backed
/// adaptive stage, and the stack composing them with a default fallback.
/// Tests substitute canned-output stubs.
#[async_trait]
pub trait Selector: Send + Sync {
    /// A short name for logging (e.g. "heuristic", "llm").
    fn name(&self) -> &str;

    /// Decide which agents should handle the query.
    ///
    /// An `Err` means this stage could not produce a decision; the caller
    /// decides whether to fall through to another stage.
    async fn select(
        &self,
        query: &Query,
        registry: &AgentRegistry,
    ) -> std::result::Result<SelectionDecision, SelectionError>;
}
