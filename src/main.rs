//! Main entry point for the application.
//!
//! This module initializes logging, loads environment variables and configuration,
//! builds the orchestrator and either runs the task given on the command line or
//! starts an interactive session.

mod cli;
mod console;

use clap::Parser;
use console::Progress;
use dialoguer::{theme::ColorfulTheme, Input};
use orchestra::config::{load_config, OrchestraConfig};
use orchestra::core::{Orchestrator, RunReport};
use orchestra::errors::ConfigError;
use orchestra::event::RunEvent;
use orchestra::llm::LlmClient;
use orchestra::utils::init_logging;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, warn};

/// Number of runs listed by the `history` command
const HISTORY_LIMIT: usize = 10;

/// Main entry point that initializes and runs the application.
///
/// # Initialization steps:
/// 1. Parse CLI arguments
/// 2. Initialize logging system
/// 3. Load environment variables
/// 4. Load configuration and apply CLI overrides
/// 5. Run the task, or start interactive mode
#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let _log_guard = init_logging(&cli.logging_level, cli.log_file);

    if let Err(e) = dotenvy::dotenv() {
        warn!("Failed to load .env file: {}", e);
    }

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let orchestrator = match build_orchestrator(&config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("Failed to start: {}", e);
            eprintln!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let progress = Progress::new();
    let (events_tx, mut events) = tokio::sync::mpsc::unbounded_channel();
    let orchestrator = orchestrator.with_events(events_tx);

    match cli.task() {
        Some(task) => {
            let report = run_task(&orchestrator, &progress, &mut events, &task).await;
            if let Some(path) = &cli.output {
                if let Err(e) = write_report(&report, path) {
                    eprintln!("Failed to write report to {}: {}", path.display(), e);
                    return ExitCode::FAILURE;
                }
            }
            if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        None => {
            interactive(&orchestrator, &progress, &mut events, cli.output.as_deref()).await;
            ExitCode::SUCCESS
        }
    }
}

/// Loads the configuration file (or defaults) and applies the CLI overrides.
fn build_config(cli: &cli::Cli) -> Result<OrchestraConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => OrchestraConfig::default(),
    };

    if let Some(provider) = &cli.llm_provider {
        config.parameters.llm_provider = provider.clone();
    }
    if let Some(model) = &cli.llm_model {
        config.parameters.llm_model = model.clone();
    }
    if let Some(max_iterations) = cli.max_iterations {
        config.parameters.max_iterations = max_iterations;
    }

    config.validate()?;
    Ok(config)
}

fn build_orchestrator(config: &OrchestraConfig) -> Result<Orchestrator, ConfigError> {
    let params = &config.parameters;
    info!("Using {} with model {}", params.llm_provider, params.llm_model);
    let llm_client = Arc::new(LlmClient::new(&params.llm_provider, &params.llm_model)?);
    Orchestrator::new(config, llm_client)
}

async fn run_task(
    orchestrator: &Orchestrator,
    progress: &Progress,
    events: &mut UnboundedReceiver<RunEvent>,
    task: &str,
) -> RunReport {
    progress.start(task);
    let report = progress.track(orchestrator.run(task, None), events).await;
    progress.finish();
    console::print_report(&report);
    report
}

fn write_report(report: &RunReport, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    info!("Report written to {}", path.display());
    Ok(())
}

/// Prompts for tasks until the user leaves.
async fn interactive(
    orchestrator: &Orchestrator,
    progress: &Progress,
    events: &mut UnboundedReceiver<RunEvent>,
    output: Option<&Path>,
) {
    console::display_welcome_message();

    loop {
        let input: String = match Input::with_theme(&ColorfulTheme::default())
            .with_prompt("📝 Your task")
            .allow_empty(true)
            .interact_text()
        {
            Ok(input) => input,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        match input.trim() {
            "" => continue,
            "quit" | "exit" | "q" => break,
            "stats" => console::print_stats(&orchestrator.worker_stats()),
            "history" => console::print_history(&orchestrator.history(HISTORY_LIMIT).await),
            task => {
                let report = run_task(orchestrator, progress, events, task).await;
                if let Some(path) = output {
                    if let Err(e) = write_report(&report, path) {
                        eprintln!("Failed to write report to {}: {}", path.display(), e);
                    }
                }
            }
        }
    }
}
