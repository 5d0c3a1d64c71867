//! Model listing command
//!
//! Shows the models installed on the backend, either as a table or as JSON.

use crate::config::Config;
use crate::error::{LlmCompareError, Result};
use crate::export::format_size;
use crate::providers::{self, ModelDescriptor};
use prettytable::{row, Table};

use super::serialize_pretty;

/// List the models installed on the backend
///
/// # Examples
///
/// ```no_run
/// use llmcompare::config::Config;
/// use llmcompare::commands::models::list_models;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load("config/config.yaml", &Default::default())?;
/// list_models(&config, false).await?;
/// # Ok(())
/// # }
/// ```
pub async fn list_models(config: &Config, json: bool) -> Result<()> {
    tracing::info!("Listing models from {}", config.backend.host);

    let provider = providers::create_provider(&config.backend)?;
    let models = provider.list_models().await?;

    if models.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("No models installed on {}", config.backend.host);
        }
        return Ok(());
    }

    if json {
        output_models_json(&models)?;
    } else {
        output_models_table(&models, &config.backend.host);
    }

    Ok(())
}

/// Output models in JSON format
///
/// # Errors
///
/// Returns `LlmCompareError::Serialization` if serialization fails
fn output_models_json(models: &[ModelDescriptor]) -> Result<()> {
    let json = serialize_pretty(models).map_err(LlmCompareError::Serialization)?;
    println!("{}", json);
    Ok(())
}

fn output_models_table(models: &[ModelDescriptor], host: &str) {
    let mut table = Table::new();
    table.add_row(row!["Model", "Family", "Parameters", "Size"]);

    for model in models {
        table.add_row(row![
            model.name,
            model.family,
            model.parameter_size,
            format_size(model.size_bytes)
        ]);
    }

    println!("\nModels installed on {}:\n", host);
    table.printstd();
    println!();
}
