//! Shared mock agents, selectors, and LLM clients for unit tests.

use async_trait::async_trait;
use cropflow_core::{
    AdvisorAgent, AgentDescriptor, AgentError, AgentId, AgentRegistry, AgentReport, LlmClient,
    LlmError, LlmRequest, LlmResponse, Query, SelectionDecision, SelectionError, SelectionSource,
    Selector,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Returns a fixed answer immediately.
pub struct StaticAgent {
    report: AgentReport,
    calls: AtomicUsize,
}

impl StaticAgent {
    pub fn answering(text: &str) -> Self {
        Self::with_report(AgentReport::answer(text))
    }

    pub fn with_report(report: AgentReport) -> Self {
        Self {
            report,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdvisorAgent for StaticAgent {
    async fn handle(&self, _query: &Query) -> Result<AgentReport, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.report.clone())
    }
}

/// Always fails.
pub struct FailingAgent;

#[async_trait]
impl AdvisorAgent for FailingAgent {
    async fn handle(&self, _query: &Query) -> Result<AgentReport, AgentError> {
        Err(AgentError::Upstream("advisory backend unreachable".into()))
    }
}

/// Never completes; used to exercise the per-agent timeout.
pub struct HangingAgent;

#[async_trait]
impl AdvisorAgent for HangingAgent {
    async fn handle(&self, _query: &Query) -> Result<AgentReport, AgentError> {
        futures::future::pending::<()>().await;
        unreachable!()
    }
}

/// Panics on invocation; the dispatcher must contain it to one slot.
pub struct PanickingAgent;

#[async_trait]
impl AdvisorAgent for PanickingAgent {
    async fn handle(&self, _query: &Query) -> Result<AgentReport, AgentError> {
        panic!("agent handler exploded");
    }
}

/// An LLM client returning one scripted reply for every call.
pub struct ScriptedLlm {
    reply: Result<String, LlmError>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new(reply: Result<String, LlmError>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(LlmResponse {
                text: text.clone(),
                model: request.model,
            }),
            Err(e) => Err(e.clone()),
        }
    }
}

/// A selector stage with a canned outcome.
pub struct FixedSelector {
    outcome: Result<(Vec<AgentId>, SelectionSource), SelectionError>,
}

impl FixedSelector {
    pub fn returning(agents: Vec<AgentId>, source: SelectionSource) -> Self {
        Self {
            outcome: Ok((agents, source)),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: Err(SelectionError::Unavailable("stage disabled in test".into())),
        }
    }
}

#[async_trait]
impl Selector for FixedSelector {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn select(
        &self,
        _query: &Query,
        _registry: &AgentRegistry,
    ) -> Result<SelectionDecision, SelectionError> {
        match &self.outcome {
            Ok((agents, source)) => Ok(SelectionDecision::new(agents.clone(), *source)),
            Err(e) => Err(e.clone()),
        }
    }
}

/// A registry with every known agent backed by a trivial static answer.
pub fn full_registry() -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    for id in AgentId::ALL {
        registry.register(
            AgentDescriptor::new(id, id.as_str(), format!("{id} test advisor")),
            Arc::new(StaticAgent::answering(&format!("{id} says hello"))),
        );
    }
    registry
}

/// A registry with exactly the given handlers.
pub fn registry_of(entries: Vec<(AgentId, Arc<dyn AdvisorAgent>)>) -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    for (id, handler) in entries {
        registry.register(
            AgentDescriptor::new(id, id.as_str(), format!("{id} test advisor")),
            handler,
        );
    }
    registry
}
