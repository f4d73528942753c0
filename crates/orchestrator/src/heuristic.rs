//! Keyword-based selection — the deterministic middle stage.
//!
//! Categories are evaluated in a fixed priority order; the first
//! category with any whole-word keyword hit wins and resolves to an
//! ordered agent plan through the workflow template library.

use async_trait::async_trait;
use cropflow_config::WorkflowLibrary;
use cropflow_core::{
    AgentRegistry, Query, SelectionDecision, SelectionError, SelectionSource, Selector,
};
use std::sync::Arc;
use tracing::debug;

/// Categories in priority order. First hit wins; later categories are
/// not consulted even if they would also match.
const CATEGORIES: [(&str, &[&str]); 5] = [
    (
        "crop_planning",
        &[
            "crop", "crops", "plant", "planting", "sow", "sowing", "seed", "seeds", "variety",
            "varieties", "soil", "fertilizer", "nutrient", "npk", "kharif", "rabi", "season",
        ],
    ),
    (
        "farm_operations",
        &[
            "irrigation",
            "irrigate",
            "watering",
            "drip",
            "sprinkler",
            "weather",
            "rain",
            "rainfall",
            "forecast",
            "temperature",
            "humidity",
            "drought",
            "schedule",
            "task",
            "tasks",
        ],
    ),
    (
        "harvest_planning",
        &[
            "harvest", "yield", "market", "price", "prices", "sell", "selling", "mandi", "profit",
            "income",
        ],
    ),
    (
        "risk_management",
        &[
            "pest",
            "pests",
            "disease",
            "diseases",
            "fungus",
            "blight",
            "insect",
            "insects",
            "spots",
            "yellow",
            "yellowing",
            "wilting",
            "curl",
            "rot",
            "insurance",
            "risk",
        ],
    ),
    (
        "farmer_support",
        &[
            "help", "advice", "guide", "guidance", "learn", "scheme", "subsidy", "loan",
        ],
    ),
];

/// The deterministic keyword stage.
pub struct HeuristicSelector {
    workflows: Arc<WorkflowLibrary>,
}

impl HeuristicSelector {
    pub fn new(workflows: Arc<WorkflowLibrary>) -> Self {
        Self { workflows }
    }

    /// The first category (in priority order) with a whole-word keyword
    /// hit in the normalized query.
    fn match_category(text: &str) -> Option<&'static str> {
        let words: Vec<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        CATEGORIES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| words.contains(k)))
            .map(|(category, _)| *category)
    }
}

#[async_trait]
impl Selector for HeuristicSelector {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn select(
        &self,
        query: &Query,
        registry: &AgentRegistry,
    ) -> std::result::Result<SelectionDecision, SelectionError> {
        let text = query.normalized_text();
        let category = Self::match_category(&text).ok_or(SelectionError::NoMatch)?;

        let plan = self
            .workflows
            .plan_for(category)
            .ok_or(SelectionError::NoMatch)?;

        let agents: Vec<_> = plan.into_iter().filter(|id| registry.contains(*id)).collect();
        if agents.is_empty() {
            return Err(SelectionError::NoMatch);
        }

        debug!(category, agents = agents.len(), "Heuristic stage matched");
        Ok(SelectionDecision::new(agents, SelectionSource::Heuristic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::full_registry;
    use cropflow_core::AgentId;

    fn selector() -> HeuristicSelector {
        HeuristicSelector::new(Arc::new(WorkflowLibrary::default()))
    }

    #[tokio::test]
    async fn symptom_query_selects_pest_diagnostics() {
        let registry = full_registry();
        let decision = selector()
            .select(&Query::new("My wheat leaves have yellow spots"), &registry)
            .await
            .unwrap();

        assert_eq!(decision.source, SelectionSource::Heuristic);
        assert!(decision.agents.contains(&AgentId::PestDiseaseDiagnostic));
    }

    #[tokio::test]
    async fn crop_query_selects_planning_plan() {
        let registry = full_registry();
        let decision = selector()
            .select(&Query::new("Which crop should I sow in clay soil?"), &registry)
            .await
            .unwrap();

        assert!(decision.agents.contains(&AgentId::CropSelector));
    }

    #[tokio::test]
    async fn first_category_wins_over_later_ones() {
        // "crop" (crop_planning) and "pests" (risk_management) both hit;
        // priority order picks crop_planning.
        let registry = full_registry();
        let decision = selector()
            .select(&Query::new("pests are eating my crop"), &registry)
            .await
            .unwrap();
        assert!(decision.agents.contains(&AgentId::CropSelector));
        assert!(!decision.agents.contains(&AgentId::PestDiseaseDiagnostic));
    }

    #[tokio::test]
    async fn no_keyword_hit_is_no_match() {
        let registry = full_registry();
        let err = selector()
            .select(&Query::new("tell me a story about dragons"), &registry)
            .await
            .unwrap_err();
        assert!(matches!(err, SelectionError::NoMatch));
    }

    #[tokio::test]
    async fn keywords_match_whole_words_only() {
        // "cropped" must not hit the "crop" keyword.
        let registry = full_registry();
        let err = selector()
            .select(&Query::new("the photo is cropped badly"), &registry)
            .await
            .unwrap_err();
        assert!(matches!(err, SelectionError::NoMatch));
    }

    #[tokio::test]
    async fn unregistered_agents_are_filtered_out() {
        use cropflow_core::AgentDescriptor;
        use std::sync::Arc;

        let mut registry = AgentRegistry::new();
        registry.register(
            AgentDescriptor::new(AgentId::CropSelector, "Crop Selector", "Picks crops"),
            Arc::new(crate::test_support::StaticAgent::answering("rice")),
        );

        let decision = selector()
            .select(&Query::new("which crop to plant"), &registry)
            .await
            .unwrap();
        assert_eq!(decision.agents, vec![AgentId::CropSelector]);
    }
}
