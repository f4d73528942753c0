//! CropFlow CLI — the main entry point.
//!
//! Commands:
//! - `ask`       — Run one advisory query through the orchestrator
//! - `agents`    — List the registered advisory agents
//! - `workflows` — Show the workflow template library
//! - `status`    — Show configuration summary

use clap::{Parser, Subcommand};

mod advisor;
mod commands;

#[derive(Parser)]
#[command(
    name = "cropflow",
    about = "CropFlow — multi-agent agricultural advisory assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the advisory system a question
    Ask {
        /// The question, in your own words
        text: String,

        /// The crop under discussion
        #[arg(long)]
        crop: Option<String>,

        /// Your location or region
        #[arg(long)]
        location: Option<String>,

        /// Render without decorated headers
        #[arg(long)]
        plain: bool,

        /// Skip the LLM-backed selection stage
        #[arg(long)]
        no_llm: bool,
    },

    /// List the registered advisory agents
    Agents,

    /// Show the workflow template library
    Workflows,

    /// Show configuration summary
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask {
            text,
            crop,
            location,
            plain,
            no_llm,
        } => commands::ask::run(text, crop, location, plain, no_llm, cli.verbose).await?,
        Commands::Agents => commands::agents::run().await?,
        Commands::Workflows => commands::workflows::run().await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
