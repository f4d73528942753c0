//! The selection fallback chain: adaptive → heuristic → default plan.
//!
//! First success wins and stages are never merged. The chain never
//! yields an empty decision: the workflow library's default plan is the
//! floor, and an empty registry — the only input with no floor at all —
//! reports no match instead.

use async_trait::async_trait;
use cropflow_config::WorkflowLibrary;
use cropflow_core::{
    AgentId, AgentRegistry, Query, SelectionDecision, SelectionError, SelectionSource, Selector,
};
use std::sync::Arc;
use tracing::{debug, info};

/// The composed selector the orchestrator actually runs.
pub struct SelectorStack {
    stages: Vec<Arc<dyn Selector>>,
    workflows: Arc<WorkflowLibrary>,
}

impl SelectorStack {
    /// Build a stack with no stages; `select` will go straight to the
    /// default plan.
    pub fn new(workflows: Arc<WorkflowLibrary>) -> Self {
        Self {
            stages: Vec::new(),
            workflows,
        }
    }

    /// Append a stage. Stages run in insertion order.
    pub fn with_stage(mut self, stage: Arc<dyn Selector>) -> Self {
        self.stages.push(stage);
        self
    }

    fn default_decision(&self, registry: &AgentRegistry) -> SelectionDecision {
        let mut agents: Vec<AgentId> = self
            .workflows
            .default_plan()
            .into_iter()
            .filter(|id| registry.contains(*id))
            .collect();

        // The configured plan may name only unregistered agents; the
        // coach is the last resort when it is itself registered.
        if agents.is_empty() && registry.contains(AgentId::FarmerCoach) {
            agents.push(AgentId::FarmerCoach);
        }
        if agents.is_empty() {
            agents = registry.ids().into_iter().take(1).collect();
        }

        SelectionDecision::new(agents, SelectionSource::Default)
    }
}

#[async_trait]
impl Selector for SelectorStack {
    fn name(&self) -> &str {
        "stack"
    }

    async fn select(
        &self,
        query: &Query,
        registry: &AgentRegistry,
    ) -> std::result::Result<SelectionDecision, SelectionError> {
        for stage in &self.stages {
            match stage.select(query, registry).await {
                Ok(decision) if !decision.is_empty() => {
                    info!(
                        stage = stage.name(),
                        source = %decision.source,
                        agents = decision.len(),
                        "Selection stage succeeded"
                    );
                    return Ok(decision);
                }
                Ok(_) => {
                    debug!(stage = stage.name(), "Stage returned empty decision, falling through");
                }
                Err(e) => {
                    debug!(stage = stage.name(), error = %e, "Stage failed, falling through");
                }
            }
        }

        let decision = self.default_decision(registry);
        if decision.is_empty() {
            return Err(SelectionError::NoMatch);
        }
        info!(agents = decision.len(), "Falling back to default plan");
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{full_registry, FixedSelector};
    use cropflow_core::AgentId;

    fn stack_with(stages: Vec<Arc<dyn Selector>>) -> SelectorStack {
        let mut stack = SelectorStack::new(Arc::new(WorkflowLibrary::default()));
        for stage in stages {
            stack = stack.with_stage(stage);
        }
        stack
    }

    #[tokio::test]
    async fn first_successful_stage_wins() {
        let registry = full_registry();
        let stack = stack_with(vec![
            Arc::new(FixedSelector::failing()),
            Arc::new(FixedSelector::returning(
                vec![AgentId::SoilHealth],
                SelectionSource::Heuristic,
            )),
            Arc::new(FixedSelector::returning(
                vec![AgentId::WeatherWatcher],
                SelectionSource::Heuristic,
            )),
        ]);

        let decision = stack.select(&Query::new("q"), &registry).await.unwrap();
        assert_eq!(decision.agents, vec![AgentId::SoilHealth]);
    }

    #[tokio::test]
    async fn stages_are_never_merged() {
        let registry = full_registry();
        let stack = stack_with(vec![
            Arc::new(FixedSelector::returning(
                vec![AgentId::CropSelector],
                SelectionSource::Llm,
            )),
            Arc::new(FixedSelector::returning(
                vec![AgentId::SoilHealth],
                SelectionSource::Heuristic,
            )),
        ]);

        let decision = stack.select(&Query::new("q"), &registry).await.unwrap();
        assert_eq!(decision.agents, vec![AgentId::CropSelector]);
        assert_eq!(decision.source, SelectionSource::Llm);
    }

    #[tokio::test]
    async fn all_stages_failing_falls_back_to_default_plan() {
        let registry = full_registry();
        let stack = stack_with(vec![
            Arc::new(FixedSelector::failing()),
            Arc::new(FixedSelector::failing()),
        ]);

        let decision = stack.select(&Query::new("q"), &registry).await.unwrap();
        assert_eq!(decision.source, SelectionSource::Default);
        assert_eq!(
            decision.agents,
            vec![AgentId::CropSelector, AgentId::FarmerCoach]
        );
    }

    #[tokio::test]
    async fn empty_stack_uses_default_plan() {
        let registry = full_registry();
        let stack = stack_with(vec![]);

        let decision = stack.select(&Query::new("q"), &registry).await.unwrap();
        assert_eq!(decision.source, SelectionSource::Default);
        assert!(!decision.is_empty());
    }

    #[tokio::test]
    async fn empty_registry_reports_no_match() {
        let registry = AgentRegistry::new();
        let stack = stack_with(vec![]);

        let err = stack.select(&Query::new("q"), &registry).await.unwrap_err();
        assert!(matches!(err, SelectionError::NoMatch));
    }

    #[tokio::test]
    async fn default_plan_filters_to_registered_agents() {
        use cropflow_core::AgentDescriptor;

        // Only the coach is registered; crop_selector in the default
        // plan is dropped.
        let mut registry = AgentRegistry::new();
        registry.register(
            AgentDescriptor::new(AgentId::FarmerCoach, "Coach", "Coaching"),
            Arc::new(crate::test_support::StaticAgent::answering("hello")),
        );

        let stack = stack_with(vec![]);
        let decision = stack.select(&Query::new("q"), &registry).await.unwrap();
        assert_eq!(decision.agents, vec![AgentId::FarmerCoach]);
    }
}
