//! Comparison run command
//!
//! Sends one prompt to the chosen models, prints progress as each answer
//! settles, and summarizes the run when every request is done.

use crate::config::Config;
use crate::coordinator::{RunCoordinator, RunEvent, RunReport};
use crate::error::{LlmCompareError, Result};
use crate::export::{duration_ms, throughput};
use crate::providers;
use colored::Colorize;
use prettytable::{format, row, Table};

use super::{open_storage, serialize_pretty, short_id, truncate};

/// Run one prompt against several models
///
/// # Arguments
///
/// * `config` - Loaded configuration
/// * `prompt` - Prompt text sent to every model
/// * `models` - Model names to include (ignored when `all` is set)
/// * `all` - Include every installed model
/// * `json` - Print the run report as JSON instead of a table
///
/// # Errors
///
/// Returns an error if the backend cannot list its models, a named model is
/// not installed, the selection is empty, or the prompt is blank. Failed
/// requests during the run are reported, not returned.
pub async fn run_comparison(
    config: &Config,
    prompt: &str,
    models: &[String],
    all: bool,
    json: bool,
) -> Result<()> {
    let provider = providers::create_provider(&config.backend)?;
    let store = open_storage(config)?;

    let mut coordinator = RunCoordinator::new(provider, store);
    coordinator.initialize().await?;

    if all {
        coordinator.select_all();
    } else {
        for name in models {
            coordinator.select(name)?;
        }
    }

    let selection = coordinator.selection();
    let mut events = coordinator.subscribe();
    let progress = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if !json {
                print_event(&event);
            }
            if event == RunEvent::RunComplete {
                break;
            }
        }
    });

    let report = coordinator.submit_prompt(prompt, &selection).await;
    drop(coordinator);
    if let Err(e) = progress.await {
        tracing::warn!("Progress printer stopped: {}", e);
    }
    let report = report?;

    if json {
        let out = serialize_pretty(&report).map_err(LlmCompareError::Serialization)?;
        println!("{}", out);
    } else {
        output_report(&report);
    }

    Ok(())
}

fn print_event(event: &RunEvent) {
    match event {
        RunEvent::RunStarted { run_id, models } => {
            eprintln!(
                "Run {} started with {} model(s): {}",
                short_id(run_id).cyan(),
                models.len(),
                models.join(", ")
            );
        }
        RunEvent::ResponseRecorded { model } => {
            eprintln!("  {} {}", "✓".green(), model);
        }
        RunEvent::RequestFailed { model } => {
            eprintln!("  {} {} (request failed)", "✗".red(), model);
        }
        RunEvent::StorageFailed { model } => {
            eprintln!("  {} {} (not saved)", "✗".red(), model);
        }
        RunEvent::RunComplete => {}
    }
}

fn output_report(report: &RunReport) {
    if !report.records.is_empty() {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
        table.add_row(row![
            "Model".bold(),
            "Total (ms)".bold(),
            "Tokens/s".bold(),
            "Response".bold()
        ]);

        for record in &report.records {
            let tokens_per_sec = throughput(record.metrics.eval_count, record.metrics.eval_duration)
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|_| "-".to_string());
            table.add_row(row![
                record.model_name.cyan(),
                format!("{:.0}", duration_ms(record.metrics.total_duration)),
                tokens_per_sec,
                truncate(&record.response, 60)
            ]);
        }

        println!();
        table.printstd();
    }

    for failure in &report.failures {
        println!(
            "{} {}: {}",
            "Failed".red().bold(),
            failure.model(),
            failure.error()
        );
    }

    println!();
    println!(
        "Run {}: {} recorded, {} failed",
        short_id(&report.run_id).cyan(),
        report.records.len().to_string().green(),
        report.failures.len().to_string().red()
    );
    println!(
        "Use {} to see full responses.",
        format!("llmcompare history show {}", short_id(&report.run_id)).cyan()
    );
    println!();
}
