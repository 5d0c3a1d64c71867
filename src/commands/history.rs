use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::Result;
use crate::export::{duration_ms, format_size, throughput};
use crate::storage::ResponseRecord;
use colored::Colorize;
use prettytable::{format, Table};

use super::{open_storage, short_id, truncate};

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let storage = open_storage(config)?;

    match command {
        HistoryCommand::List => {
            let runs = storage.list_runs()?;

            if runs.is_empty() {
                println!("{}", "No recorded runs found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "ID".bold(),
                "Query".bold(),
                "Responses".bold(),
                "Started".bold()
            ]);

            for run in runs {
                let started = run.started_at.format("%Y-%m-%d %H:%M").to_string();
                table.add_row(prettytable::row![
                    short_id(&run.run_id).cyan(),
                    truncate(&run.query, 40),
                    run.response_count,
                    started
                ]);
            }

            println!("\nRecorded runs:");
            table.printstd();
            println!();
            println!(
                "Use {} to see every response of a run.",
                "llmcompare history show <ID>".cyan()
            );
            println!();
        }
        HistoryCommand::Show { run_id } => {
            let records = storage.load_run(&run_id)?;

            if records.is_empty() {
                println!("{}", format!("No run found matching {}", run_id).yellow());
                return Ok(());
            }

            println!(
                "\nRun {} ({})",
                records[0].run_id.cyan(),
                records[0].started_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("{} {}\n", "Query:".bold(), records[0].query);

            for record in &records {
                print_record(record);
            }
        }
    }

    Ok(())
}

fn print_record(record: &ResponseRecord) {
    let m = &record.metrics;
    let rate = |count, duration| {
        throughput(count, duration)
            .map(|v| format!("{:.1} tok/s", v))
            .unwrap_or_else(|_| "-".to_string())
    };

    println!(
        "{} [{} {} {}]",
        record.model_name.green().bold(),
        record.model_family,
        record.parameter_size,
        format_size(record.model_size)
    );
    println!(
        "  total {:.0} ms, load {:.0} ms, prompt {} tokens ({}), response {} tokens ({})",
        duration_ms(m.total_duration),
        duration_ms(m.load_duration),
        m.prompt_eval_count,
        rate(m.prompt_eval_count, m.prompt_eval_duration),
        m.eval_count,
        rate(m.eval_count, m.eval_duration)
    );
    println!("{}\n", record.response);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::storage::ResponseStore;
    use crate::test_utils::{sample_record, temp_dir};

    fn config_with_db(dir: &tempfile::TempDir) -> Config {
        Config {
            storage: StorageConfig {
                db_path: Some(dir.path().join("responses.db")),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_history_list_empty_db() {
        let dir = temp_dir();
        let config = config_with_db(&dir);
        assert!(handle_history(&config, HistoryCommand::List).is_ok());
    }

    #[test]
    fn test_history_show_existing_run() {
        let dir = temp_dir();
        let config = config_with_db(&dir);
        let storage = open_storage(&config).unwrap();
        storage
            .append(&sample_record("abcdef12-3456-7890-abcd-ef1234567890", "llama3:8b"))
            .unwrap();

        let result = handle_history(
            &config,
            HistoryCommand::Show {
                run_id: "abcdef12".to_string(),
            },
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_history_show_missing_run_is_not_error() {
        let dir = temp_dir();
        let config = config_with_db(&dir);
        let result = handle_history(
            &config,
            HistoryCommand::Show {
                run_id: "ffffffff".to_string(),
            },
        );
        assert!(result.is_ok());
    }
}
