//! Advisory agent identifiers, descriptors, the handler trait, and the
//! typed registry.
//!
//! Agents are independently-owned advisory subsystems. The orchestrator
//! only ever talks to them through [`AdvisorAgent::handle`]; everything
//! behind that call (crop scoring, yield regression, market lookups) is
//! someone else's problem.

use crate::error::AgentError;
use crate::query::Query;
use crate::report::AgentReport;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// The advisory agents known to the platform.
///
/// String-keyed dispatch is deliberately avoided: an unknown agent name
/// fails at the edge (parsing), never deep inside a dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentId {
    CropSelector,
    SeedSelection,
    SoilHealth,
    FertilizerAdvisor,
    IrrigationPlanner,
    PestDiseaseDiagnostic,
    WeatherWatcher,
    GrowthStageMonitor,
    TaskScheduler,
    YieldPredictor,
    ProfitOptimization,
    MarketIntelligence,
    CropInsuranceRisk,
    FarmerCoach,
}

impl AgentId {
    /// All known agent identifiers, in declaration order.
    pub const ALL: [AgentId; 14] = [
        AgentId::CropSelector,
        AgentId::SeedSelection,
        AgentId::SoilHealth,
        AgentId::FertilizerAdvisor,
        AgentId::IrrigationPlanner,
        AgentId::PestDiseaseDiagnostic,
        AgentId::WeatherWatcher,
        AgentId::GrowthStageMonitor,
        AgentId::TaskScheduler,
        AgentId::YieldPredictor,
        AgentId::ProfitOptimization,
        AgentId::MarketIntelligence,
        AgentId::CropInsuranceRisk,
        AgentId::FarmerCoach,
    ];

    /// The stable wire name of this agent (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::CropSelector => "crop_selector",
            AgentId::SeedSelection => "seed_selection",
            AgentId::SoilHealth => "soil_health",
            AgentId::FertilizerAdvisor => "fertilizer_advisor",
            AgentId::IrrigationPlanner => "irrigation_planner",
            AgentId::PestDiseaseDiagnostic => "pest_disease_diagnostic",
            AgentId::WeatherWatcher => "weather_watcher",
            AgentId::GrowthStageMonitor => "growth_stage_monitor",
            AgentId::TaskScheduler => "task_scheduler",
            AgentId::YieldPredictor => "yield_predictor",
            AgentId::ProfitOptimization => "profit_optimization",
            AgentId::MarketIntelligence => "market_intelligence",
            AgentId::CropInsuranceRisk => "crop_insurance_risk",
            AgentId::FarmerCoach => "farmer_coach",
        }
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AgentId::ALL
            .iter()
            .find(|id| id.as_str() == s.trim())
            .copied()
            .ok_or_else(|| format!("Unknown agent: '{s}'"))
    }
}

/// Static description of an agent: identity plus declared capabilities.
///
/// Descriptors are defined once at startup and never mutated; the set of
/// descriptors *is* the registry's public face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// The agent's identifier.
    pub id: AgentId,

    /// Human-readable name (e.g. "Pest & Disease Diagnostic Agent").
    pub name: String,

    /// One-line description of what this agent advises on.
    pub description: String,

    /// Capability keywords, used when describing the agent to the
    /// LLM-backed selector.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl AgentDescriptor {
    pub fn new(id: AgentId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            keywords: Vec::new(),
        }
    }

    /// Attach capability keywords.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

/// The contract every advisory agent implements.
///
/// Handlers are assumed reentrant: the dispatcher may invoke the same
/// handler from several in-flight requests at once. A handler reports
/// failure by returning `Err` — never by panicking — though the
/// dispatcher contains panics to the offending slot anyway.
#[async_trait]
pub trait AdvisorAgent: Send + Sync {
    /// Produce a structured partial answer for the query.
    async fn handle(&self, query: &Query) -> std::result::Result<AgentReport, AgentError>;
}

/// A typed registry mapping [`AgentId`] to descriptor + handler.
///
/// Built once at startup and shared read-only across requests.
pub struct AgentRegistry {
    entries: HashMap<AgentId, RegisteredAgent>,
}

struct RegisteredAgent {
    descriptor: AgentDescriptor,
    handler: Arc<dyn AdvisorAgent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register an agent. Replaces any existing entry with the same id.
    pub fn register(&mut self, descriptor: AgentDescriptor, handler: Arc<dyn AdvisorAgent>) {
        self.entries.insert(
            descriptor.id,
            RegisteredAgent {
                descriptor,
                handler,
            },
        );
    }

    /// Look up a handler by id.
    pub fn handler(&self, id: AgentId) -> Option<Arc<dyn AdvisorAgent>> {
        self.entries.get(&id).map(|e| e.handler.clone())
    }

    /// Look up a descriptor by id.
    pub fn descriptor(&self, id: AgentId) -> Option<&AgentDescriptor> {
        self.entries.get(&id).map(|e| &e.descriptor)
    }

    /// Whether an agent is registered.
    pub fn contains(&self, id: AgentId) -> bool {
        self.entries.contains_key(&id)
    }

    /// All registered ids, in [`AgentId::ALL`] order for determinism.
    pub fn ids(&self) -> Vec<AgentId> {
        AgentId::ALL
            .iter()
            .filter(|id| self.entries.contains_key(id))
            .copied()
            .collect()
    }

    /// All descriptors, in [`AgentId::ALL`] order.
    pub fn descriptors(&self) -> Vec<&AgentDescriptor> {
        AgentId::ALL
            .iter()
            .filter_map(|id| self.entries.get(id).map(|e| &e.descriptor))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
