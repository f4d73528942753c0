//! `cropflow status` — show configuration summary.

use cropflow_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("CropFlow Status");
    println!("===============");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!(
        "  LLM backend:    {}",
        if config.llm.enabled {
            &config.llm.provider
        } else {
            "disabled"
        }
    );
    println!("  Model:          {}", config.llm.model);
    println!("  Temperature:    {}", config.llm.temperature);
    println!(
        "  API key:        {}",
        if config.llm.api_key.is_some() {
            "configured"
        } else {
            "not set"
        }
    );
    println!(
        "  Adaptive stage: {}",
        if config.selector.llm_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Max agents:     {}", config.selector.max_agents);
    println!("  Agent timeout:  {}s", config.dispatch.agent_timeout_secs);
    println!("  Templates:      {}", config.workflows.templates.len());

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() || std::path::Path::new("cropflow.toml").exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file — using built-in defaults");
    }

    Ok(())
}
