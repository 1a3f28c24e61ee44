mod catalyst;
mod config;
mod error;
mod evaluator;
mod monitoring;
mod orchestrator;
mod scout_agent;
mod storage;

use anyhow::{Result, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use orchestrator::{AlphaScout, RunOutcome};
use scout_agent::{CatalystSource, GeminiScout, ReplaySource};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scouting pass: query, filter, persist, alert
    Run {
        /// Feed a saved report through the pipeline instead of querying the model
        #[arg(long, value_name = "FILE")]
        replay: Option<PathBuf>,
    },
    /// Validate configuration and prepare the data directory
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    info!("Alpha Scout initializing...");

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { replay }) => {
            let config = config::load_config().context("loading configuration")?;
            let outcome = match replay {
                Some(path) => run_scout(&config, ReplaySource::new(path)).await,
                None => {
                    let scout = GeminiScout::new(
                        config.gemini_api_key.clone(),
                        config.model_id.clone(),
                        config.gemini_api_base.clone(),
                    );
                    run_scout(&config, scout).await
                }
            };
            info!("Run outcome: {:?}", outcome);
        }
        Some(Commands::Init) => {
            config::initialize_config()?;
        }
        None => {
            info!("No command specified. Use --help for available commands.");
        }
    }

    Ok(())
}

async fn run_scout<S: CatalystSource>(config: &config::Config, source: S) -> RunOutcome {
    AlphaScout::new(config, source).run().await
}
