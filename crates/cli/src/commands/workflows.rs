//! `cropflow workflows` — show the workflow template library.

use cropflow_config::{AppConfig, WorkflowLibrary};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let library = WorkflowLibrary::from_config(&config.workflows);

    println!("Workflow templates:");
    for category in library.categories() {
        let plan = library.plan_for(&category).unwrap_or_default();
        let agents: Vec<&str> = plan.iter().map(|id| id.as_str()).collect();
        println!("  {:<20} → {}", category, agents.join(", "));
    }

    let default_plan: Vec<&str> = library.default_plan().iter().map(|id| id.as_str()).collect();
    println!();
    println!("Default plan: {}", default_plan.join(", "));

    Ok(())
}
