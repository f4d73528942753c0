//! Configuration loading, validation, and workflow templates for CropFlow.
//!
//! Loads configuration from `cropflow.toml` with environment variable
//! overrides, validates all settings at load time, and owns the
//! hot-reloadable [`WorkflowLibrary`] that maps query categories to
//! ordered agent plans.

pub mod workflow;

pub use workflow::WorkflowLibrary;

use cropflow_core::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The root configuration structure.
///
/// Maps directly to `cropflow.toml`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// LLM backend settings (used by the adaptive selector and demo advisors).
    #[serde(default)]
    pub llm: LlmSettings,

    /// Agent selection settings.
    #[serde(default)]
    pub selector: SelectorSettings,

    /// Dispatch settings.
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Workflow templates: category -> ordered agent plan.
    #[serde(default)]
    pub workflows: WorkflowConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Whether any LLM backend is configured at all.
    #[serde(default)]
    pub enabled: bool,

    /// Backend name, informational only.
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Base URL of an OpenAI-compatible endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key. Redacted in Debug output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for selector prompts.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_llm_provider() -> String {
    "openai_compat".into()
}
fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.2
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_llm_provider(),
            api_url: default_api_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("enabled", &self.enabled)
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("llm", &self.llm)
            .field("selector", &self.selector)
            .field("dispatch", &self.dispatch)
            .field("workflows", &self.workflows)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorSettings {
    /// Whether the LLM-backed adaptive stage runs at all.
    #[serde(default = "default_true")]
    pub llm_enabled: bool,

    /// Cap on how many agents one query may fan out to.
    #[serde(default = "default_max_agents")]
    pub max_agents: usize,
}

fn default_true() -> bool {
    true
}
fn default_max_agents() -> usize {
    5
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            llm_enabled: true,
            max_agents: default_max_agents(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Per-agent timeout in seconds. Short by default: agent handlers
    /// call network-backed services themselves.
    #[serde(default = "default_agent_timeout")]
    pub agent_timeout_secs: u64,
}

fn default_agent_timeout() -> u64 {
    30
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            agent_timeout_secs: default_agent_timeout(),
        }
    }
}

/// Workflow templates as written in the config file.
///
/// Agent names are kept as strings here so the file stays hand-editable;
/// `validate()` proves they all parse as [`AgentId`] before anything
/// downstream sees them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// category -> ordered agent names.
    #[serde(default = "default_templates")]
    pub templates: BTreeMap<String, Vec<String>>,

    /// The plan used when no stage produces a selection.
    #[serde(default = "default_plan")]
    pub default_plan: Vec<String>,
}

fn default_templates() -> BTreeMap<String, Vec<String>> {
    let mut t = BTreeMap::new();
    t.insert(
        "crop_planning".into(),
        vec![
            "crop_selector".into(),
            "seed_selection".into(),
            "soil_health".into(),
            "fertilizer_advisor".into(),
        ],
    );
    t.insert(
        "farm_operations".into(),
        vec!["task_scheduler".into(), "weather_watcher".into(), "irrigation_planner".into()],
    );
    t.insert(
        "harvest_planning".into(),
        vec![
            "yield_predictor".into(),
            "market_intelligence".into(),
            "profit_optimization".into(),
        ],
    );
    t.insert(
        "risk_management".into(),
        vec!["pest_disease_diagnostic".into(), "crop_insurance_risk".into()],
    );
    t.insert("farmer_support".into(), vec!["farmer_coach".into()]);
    t
}

fn default_plan() -> Vec<String> {
    vec!["crop_selector".into(), "farmer_coach".into()]
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            templates: default_templates(),
            default_plan: default_plan(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (`./cropflow.toml`, then
    /// `~/.cropflow/config.toml`), with environment variable overrides:
    /// - `CROPFLOW_API_KEY` — LLM API key
    /// - `CROPFLOW_MODEL` — model name
    /// - `CROPFLOW_LLM_ENABLED` — "0"/"false" disables the adaptive stage
    pub fn load() -> Result<Self, ConfigError> {
        let local = PathBuf::from("cropflow.toml");
        let path = if local.exists() {
            local
        } else {
            Self::config_dir().join("config.toml")
        };
        let mut config = Self::load_from(&path)?;

        if let Ok(key) = std::env::var("CROPFLOW_API_KEY") {
            config.llm.api_key = Some(key);
            config.llm.enabled = true;
        }
        if let Ok(model) = std::env::var("CROPFLOW_MODEL") {
            config.llm.model = model;
        }
        if let Ok(flag) = std::env::var("CROPFLOW_LLM_ENABLED") {
            config.selector.llm_enabled = !matches!(flag.as_str(), "0" | "false" | "no");
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cropflow")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.temperature < 0.0 || self.llm.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.selector.max_agents == 0 {
            return Err(ConfigError::ValidationError(
                "selector.max_agents must be at least 1".into(),
            ));
        }

        if self.dispatch.agent_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "dispatch.agent_timeout_secs must be at least 1".into(),
            ));
        }

        if self.workflows.default_plan.is_empty() {
            return Err(ConfigError::ValidationError(
                "workflows.default_plan must name at least one agent".into(),
            ));
        }

        for (category, agents) in &self.workflows.templates {
            for name in agents {
                AgentId::from_str(name).map_err(|_| {
                    ConfigError::ValidationError(format!(
                        "workflow template '{category}' names unknown agent '{name}'"
                    ))
                })?;
            }
        }
        for name in &self.workflows.default_plan {
            AgentId::from_str(name).map_err(|_| {
                ConfigError::ValidationError(format!("default_plan names unknown agent '{name}'"))
            })?;
        }

        Ok(())
    }

    /// Generate a default config TOML string (for first-run setup).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.llm.enabled);
        assert_eq!(config.dispatch.agent_timeout_secs, 30);
        assert_eq!(config.selector.max_agents, 5);
    }

    #[test]
    fn default_templates_cover_all_categories() {
        let config = AppConfig::default();
        for category in [
            "crop_planning",
            "farm_operations",
            "harvest_planning",
            "risk_management",
            "farmer_support",
        ] {
            assert!(
                config.workflows.templates.contains_key(category),
                "missing template: {category}"
            );
        }
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.workflows.default_plan, config.workflows.default_plan);
        assert_eq!(parsed.llm.model, config.llm.model);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            llm: LlmSettings {
                temperature: 5.0,
                ..LlmSettings::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_agent_in_template_rejected() {
        let mut config = AppConfig::default();
        config
            .workflows
            .templates
            .insert("crop_planning".into(), vec!["quantum_tractor".into()]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quantum_tractor"));
    }

    #[test]
    fn empty_default_plan_rejected() {
        let mut config = AppConfig::default();
        config.workflows.default_plan.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/cropflow.toml"));
        assert!(result.is_ok());
        assert!(!result.unwrap().llm.enabled);
    }

    #[test]
    fn config_file_parsing() {
        let toml_str = r#"
[llm]
enabled = true
model = "gemini-2.0-flash"

[selector]
llm_enabled = false
max_agents = 3

[dispatch]
agent_timeout_secs = 10

[workflows]
default_plan = ["farmer_coach"]

[workflows.templates]
risk_management = ["pest_disease_diagnostic"]
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml_str.as_bytes()).unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert!(config.llm.enabled);
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert!(!config.selector.llm_enabled);
        assert_eq!(config.selector.max_agents, 3);
        assert_eq!(config.dispatch.agent_timeout_secs, 10);
        assert_eq!(config.workflows.default_plan, vec!["farmer_coach"]);
        // Explicit templates replace the defaults wholesale
        assert_eq!(config.workflows.templates.len(), 1);
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("crop_selector"));
        assert!(toml_str.contains("risk_management"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            llm: LlmSettings {
                api_key: Some("sk-secret".into()),
                ..LlmSettings::default()
            },
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
