//! Terminal presentation: progress spinner, reports, statistics.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use orchestra::core::{PlanSource, RunReport};
use orchestra::event::RunEvent;
use orchestra::workers::WorkerStats;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Spinner shown while a run is in progress, driven by [`RunEvent`]s.
#[derive(Debug, Clone)]
pub struct Progress {
    spinner: ProgressBar,
}

impl Progress {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner} [{elapsed_precise}] {msg}")
        {
            spinner.set_style(style);
        }
        Self { spinner }
    }

    pub fn start(&self, task: &str) {
        self.spinner.reset();
        self.spinner.enable_steady_tick(Duration::from_millis(120));
        self.spinner.set_message(format!("Planning: {}", task));
    }

    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    /// Drives `run` while rendering its events, then renders whatever the
    /// run queued before finishing. Nothing is left for after `finish`.
    pub async fn track<T>(
        &self,
        run: impl Future<Output = T>,
        events: &mut UnboundedReceiver<RunEvent>,
    ) -> T {
        tokio::pin!(run);
        let output = loop {
            tokio::select! {
                output = &mut run => break output,
                Some(event) = events.recv() => render_event(&self.spinner, event),
            }
        };
        while let Ok(event) = events.try_recv() {
            render_event(&self.spinner, event);
        }
        output
    }
}

fn render_event(spinner: &ProgressBar, event: RunEvent) {
    match event {
        RunEvent::PlanReady(plan) => {
            let source = match &plan.source {
                PlanSource::Template { id } => format!("template '{}'", id),
                PlanSource::Generated => "generated".to_string(),
                PlanSource::Default => "default".to_string(),
            };
            spinner.println(format!("{} {} ({})", "📋".bold(), "Plan".bold(), source.dimmed()));
            for (i, step) in plan.steps.iter().enumerate() {
                spinner.println(format!(
                    "   {}. {} {}",
                    i + 1,
                    step.worker.to_string().cyan(),
                    step.instruction
                ));
            }
        }
        RunEvent::StepStarted {
            index,
            total,
            worker,
            instruction,
        } => {
            spinner.set_message(format!("[{}/{}] {}: {}", index + 1, total, worker, instruction));
        }
        RunEvent::StepFinished {
            index,
            worker,
            error,
        } => match error {
            None => spinner.println(format!("{} step {} ({})", "✔".green(), index + 1, worker)),
            Some(error) => spinner.println(format!(
                "{} step {} ({}): {}",
                "✘".red(),
                index + 1,
                worker,
                error.red()
            )),
        },
        RunEvent::IterationCeiling {
            executed,
            remaining,
        } => {
            spinner.println(
                format!(
                    "⚠ iteration ceiling reached after {} steps, {} skipped",
                    executed, remaining
                )
                .yellow()
                .to_string(),
            );
        }
        RunEvent::Synthesizing { successful } => {
            spinner.set_message(format!("Synthesizing {} outputs", successful));
        }
    }
}

pub fn display_welcome_message() {
    println!("\n{}", "🎼 Welcome to Orchestra!".bold().green());
    println!(
        "{}",
        "Describe a task and the workers will take it from there.".dimmed()
    );
    println!(
        "{}\n",
        "Commands: 'stats', 'history', 'quit'".dimmed()
    );
}

fn format_seconds(seconds: f64) -> String {
    let millis = (seconds.max(0.0) * 1000.0).round() as u64;
    humantime::format_duration(Duration::from_millis(millis)).to_string()
}

pub fn print_report(report: &RunReport) {
    println!("\n{}", "═".repeat(60).dimmed());
    match (&report.output, &report.error) {
        (Some(output), _) => println!("{}", output),
        (None, Some(error)) => println!("{} {}", "Run failed:".red().bold(), error),
        (None, None) => println!("{}", "No output".yellow()),
    }
    println!("{}", "═".repeat(60).dimmed());

    let summary = &report.summary;
    let workers = summary
        .workers_used
        .iter()
        .map(|w| w.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{} {} in {} | steps {}/{} ({} failed) | workers: {} | messages: {}",
        if report.success {
            "✔".green()
        } else {
            "✘".red()
        },
        report.run_id.dimmed(),
        format_seconds(report.execution_time_seconds),
        summary.steps_executed,
        summary.steps_planned,
        summary.failed_steps,
        workers,
        summary.messages_exchanged
    );
}

pub fn print_stats(stats: &[WorkerStats]) {
    println!("\n{}", "📊 Worker statistics".bold());
    for stat in stats {
        println!(
            "   {:<16} executions: {:<4} generation calls: {:<4} tokens: {:<8} avg/exec: {:.1}",
            stat.name.cyan(),
            stat.executions,
            stat.generation_calls,
            stat.total_tokens,
            stat.average_tokens
        );
    }
    println!();
}

pub fn print_history(reports: &[RunReport]) {
    if reports.is_empty() {
        println!("{}", "No runs yet.".dimmed());
        return;
    }
    println!("\n{}", "🕘 Recent runs".bold());
    for report in reports {
        println!(
            "   {} {} {} ({})",
            report.timestamp.format("%H:%M:%S").to_string().dimmed(),
            if report.success {
                "✔".green()
            } else {
                "✘".red()
            },
            report.task,
            format_seconds(report.execution_time_seconds)
        );
    }
    println!();
}
