//! The demo advisory agents: every registry slot is backed by one
//! generic LLM-prompted advisor. Real deployments swap in handlers that
//! call dedicated advisory backends; the orchestrator only ever sees
//! the `AdvisorAgent` trait either way.

use async_trait::async_trait;
use cropflow_core::{
    AdvisorAgent, AgentDescriptor, AgentError, AgentId, AgentRegistry, AgentReport, LlmClient,
    Query,
};
use std::sync::Arc;
use tracing::debug;

/// A generic advisor that prompts the configured LLM with its specialty
/// and parses the reply into a structured report.
pub struct LlmAdvisor {
    /// `None` means no backend is configured: every call fails cleanly
    /// and the orchestrator degrades to the clarifying fallback.
    client: Option<Arc<dyn LlmClient>>,
    model: String,
    specialty: String,
    agent: AgentId,
}

impl LlmAdvisor {
    pub fn new(
        client: Option<Arc<dyn LlmClient>>,
        model: impl Into<String>,
        agent: AgentId,
        specialty: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            specialty: specialty.into(),
            agent,
        }
    }

    fn build_prompt(&self, query: &Query) -> String {
        let mut context_lines = Vec::new();
        if let Some(crop) = &query.context.crop {
            context_lines.push(format!("Crop: {crop}"));
        }
        if let Some(location) = &query.context.location {
            context_lines.push(format!("Location: {location}"));
        }
        let context_text = if context_lines.is_empty() {
            String::new()
        } else {
            format!("\nContext:\n{}\n", context_lines.join("\n"))
        };

        format!(
            "You are an agricultural specialist: {specialty}.\n\
             Farmer's question: \"{text}\"\n{context}\n\
             Reply with a JSON object using these keys (omit any that do not apply):\n\
             {{\"answer\": \"...\", \"recommendations\": [\"...\"], \
             \"warnings\": [\"...\"], \"next_steps\": [\"...\"]}}",
            specialty = self.specialty,
            text = query.text.trim(),
            context = context_text,
        )
    }
}

#[async_trait]
impl AdvisorAgent for LlmAdvisor {
    async fn handle(&self, query: &Query) -> Result<AgentReport, AgentError> {
        let Some(client) = &self.client else {
            return Err(AgentError::Upstream("no LLM backend configured".into()));
        };

        let request = cropflow_core::LlmRequest::new(&self.model, self.build_prompt(query));
        let response = client
            .complete(request)
            .await
            .map_err(|e| AgentError::Upstream(e.to_string()))?;

        debug!(agent = %self.agent, chars = response.text.len(), "Advisor reply received");
        parse_report(self.agent.as_str(), &response.text)
    }
}

/// Parse the model's reply into a report. A reply with a JSON object in
/// it goes through the structured path; anything else is kept verbatim
/// as the answer text.
fn parse_report(agent: &str, text: &str) -> Result<AgentReport, AgentError> {
    if let Some(json) = extract_json_object(text) {
        if let Ok(value) = serde_json::from_str(json) {
            return AgentReport::from_value(agent, value);
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AgentError::MalformedPayload("empty reply".into()));
    }
    Ok(AgentReport::answer(trimmed))
}

fn extract_json_object(text: &str) -> Option<&str> {
    let text = text.trim();

    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return Some(inner);
            }
        }
    }

    let open = text.find('{')?;
    let close = text.rfind('}')?;
    (close > open).then(|| &text[open..=close])
}

/// Descriptor + specialty text for every known agent.
fn agent_catalog() -> Vec<(AgentDescriptor, &'static str)> {
    vec![
        (
            AgentDescriptor::new(
                AgentId::CropSelector,
                "Crop Selector Agent",
                "Selects the best crops based on soil, weather, and market conditions",
            )
            .with_keywords(["crop", "soil", "season"]),
            "crop selection for the coming season",
        ),
        (
            AgentDescriptor::new(
                AgentId::SeedSelection,
                "Seed Selection Agent",
                "Recommends the best seeds and varieties for selected crops",
            )
            .with_keywords(["seed", "variety", "hybrid"]),
            "seed and variety recommendation",
        ),
        (
            AgentDescriptor::new(
                AgentId::SoilHealth,
                "Soil Health Agent",
                "Analyzes soil conditions and provides health recommendations",
            )
            .with_keywords(["soil", "ph", "salinity"]),
            "soil health analysis",
        ),
        (
            AgentDescriptor::new(
                AgentId::FertilizerAdvisor,
                "Fertilizer Advisor Agent",
                "Provides fertilizer recommendations based on soil analysis",
            )
            .with_keywords(["fertilizer", "nutrient", "npk"]),
            "fertilizer and nutrient planning",
        ),
        (
            AgentDescriptor::new(
                AgentId::IrrigationPlanner,
                "Irrigation Planner Agent",
                "Plans irrigation schedules based on weather and crop needs",
            )
            .with_keywords(["irrigation", "watering", "drip"]),
            "irrigation scheduling",
        ),
        (
            AgentDescriptor::new(
                AgentId::PestDiseaseDiagnostic,
                "Pest & Disease Diagnostic Agent",
                "Diagnoses pest and disease issues and provides treatment plans",
            )
            .with_keywords(["pest", "disease", "blight"]),
            "pest and disease diagnosis and treatment",
        ),
        (
            AgentDescriptor::new(
                AgentId::WeatherWatcher,
                "Weather Watcher Agent",
                "Monitors weather conditions and gives forecast-driven advice",
            )
            .with_keywords(["weather", "rain", "forecast"]),
            "weather monitoring and forecast interpretation",
        ),
        (
            AgentDescriptor::new(
                AgentId::GrowthStageMonitor,
                "Growth Stage Monitor Agent",
                "Tracks crop growth stages and flags stage-specific actions",
            )
            .with_keywords(["growth", "stage", "flowering"]),
            "crop growth stage monitoring",
        ),
        (
            AgentDescriptor::new(
                AgentId::TaskScheduler,
                "Task Scheduler Agent",
                "Plans and prioritizes day-to-day farm operations",
            )
            .with_keywords(["task", "schedule", "operations"]),
            "farm task scheduling",
        ),
        (
            AgentDescriptor::new(
                AgentId::YieldPredictor,
                "Yield Predictor Agent",
                "Estimates expected yield from crop and field conditions",
            )
            .with_keywords(["yield", "harvest", "estimate"]),
            "yield prediction",
        ),
        (
            AgentDescriptor::new(
                AgentId::ProfitOptimization,
                "Profit Optimization Agent",
                "Optimizes input costs and revenue for the season",
            )
            .with_keywords(["profit", "cost", "income"]),
            "farm profit optimization",
        ),
        (
            AgentDescriptor::new(
                AgentId::MarketIntelligence,
                "Market Intelligence Agent",
                "Tracks market prices and demand for crops",
            )
            .with_keywords(["market", "price", "mandi"]),
            "crop market intelligence",
        ),
        (
            AgentDescriptor::new(
                AgentId::CropInsuranceRisk,
                "Crop Insurance & Risk Agent",
                "Assesses crop risk and insurance options",
            )
            .with_keywords(["insurance", "risk", "claim"]),
            "crop risk assessment and insurance",
        ),
        (
            AgentDescriptor::new(
                AgentId::FarmerCoach,
                "Farmer Coach Agent",
                "General farming guidance, schemes, and best practices",
            )
            .with_keywords(["advice", "guidance", "scheme"]),
            "general farming coaching",
        ),
    ]
}

/// Build the default registry: every known agent backed by an
/// [`LlmAdvisor`] over the given client.
pub fn default_registry(client: Option<Arc<dyn LlmClient>>, model: &str) -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    for (descriptor, specialty) in agent_catalog() {
        let advisor = LlmAdvisor::new(client.clone(), model, descriptor.id, specialty);
        registry.register(descriptor, Arc::new(advisor));
    }
    registry
}
