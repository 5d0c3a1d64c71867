//! llmcompare - compare local language models side by side
//!
#![doc = "llmcompare - compare local language models side by side"]
#![doc = "Main entry point for the llmcompare application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use llmcompare::cli::{Cli, Commands};
use llmcompare::commands;
use llmcompare::config::{Config, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Models { json } => {
            tracing::info!("Starting model listing command");
            commands::models::list_models(&config, json).await?;
            Ok(())
        }
        Commands::Run {
            prompt,
            models,
            all,
            json,
        } => {
            tracing::info!("Starting comparison run");
            if all {
                tracing::debug!("Selecting every installed model");
            } else {
                tracing::debug!("Selected models: {}", models.join(", "));
            }
            commands::run::run_comparison(&config, &prompt, &models, all, json).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
        Commands::Export { output } => {
            tracing::info!("Starting export command");
            commands::export::export_responses(&config, output)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so table and JSON output on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "llmcompare=debug"
    } else {
        "llmcompare=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
