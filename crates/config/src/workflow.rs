//! The workflow template library — category plans, shared read-only,
//! hot-reloadable.
//!
//! The orchestrator core never mutates templates; it looks plans up by
//! category. `reload_from` swaps the whole template set atomically so
//! in-flight requests see either the old or the new set, never a mix.

use crate::{AppConfig, ConfigError, WorkflowConfig};
use cropflow_core::AgentId;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::RwLock;
use tracing::info;

/// Parsed workflow templates behind a read-write lock.
pub struct WorkflowLibrary {
    inner: RwLock<Plans>,
}

struct Plans {
    templates: BTreeMap<String, Vec<AgentId>>,
    default_plan: Vec<AgentId>,
}

impl WorkflowLibrary {
    /// Build a library from a validated [`WorkflowConfig`].
    ///
    /// Agent names that fail to parse are skipped with a warning rather
    /// than poisoning the whole library; `AppConfig::validate` rejects
    /// them earlier for file-based loads.
    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self {
            inner: RwLock::new(Plans::parse(config)),
        }
    }

    /// The ordered agent plan for a category, if one is configured.
    pub fn plan_for(&self, category: &str) -> Option<Vec<AgentId>> {
        let plans = self.inner.read().expect("workflow lock poisoned");
        plans.templates.get(category).cloned()
    }

    /// The configured default plan.
    pub fn default_plan(&self) -> Vec<AgentId> {
        let plans = self.inner.read().expect("workflow lock poisoned");
        plans.default_plan.clone()
    }

    /// All configured category names, sorted.
    pub fn categories(&self) -> Vec<String> {
        let plans = self.inner.read().expect("workflow lock poisoned");
        plans.templates.keys().cloned().collect()
    }

    /// Re-read templates from a config file and swap them in atomically.
    pub fn reload_from(&self, path: &Path) -> Result<(), ConfigError> {
        let config = AppConfig::load_from(path)?;
        let plans = Plans::parse(&config.workflows);
        let count = plans.templates.len();
        *self.inner.write().expect("workflow lock poisoned") = plans;
        info!(path = %path.display(), templates = count, "Workflow templates reloaded");
        Ok(())
    }
}

impl Default for WorkflowLibrary {
    fn default() -> Self {
        Self::from_config(&WorkflowConfig::default())
    }
}

impl Plans {
    fn parse(config: &WorkflowConfig) -> Self {
        let templates = config
            .templates
            .iter()
            .map(|(category, names)| (category.clone(), parse_agents(category, names)))
            .collect();

        let mut default_plan = parse_agents("default_plan", &config.default_plan);
        if default_plan.is_empty() {
            // The default plan is the floor of the selection fallback
            // chain and must never be empty.
            default_plan.push(AgentId::FarmerCoach);
        }

        Self {
            templates,
            default_plan,
        }
    }
}

fn parse_agents(category: &str, names: &[String]) -> Vec<AgentId> {
    let mut agents = Vec::with_capacity(names.len());
    for name in names {
        match AgentId::from_str(name) {
            Ok(id) => {
                if !agents.contains(&id) {
                    agents.push(id);
                }
            }
            Err(_) => {
                tracing::warn!(category, agent = %name, "Skipping unknown agent in workflow template");
            }
        }
    }
    agents
}
