use super::archive::ReportArchive;
use super::executor::StepExecutor;
use super::plan::TemplateCatalogue;
use super::planner::Planner;
use super::report::{ExecutionSummary, RunReport};
use super::run_loop::{RunLoop, RunTrace};
use super::shared_state::SharedState;
use super::synthesizer::Synthesizer;
use crate::config::{OrchestraConfig, ParametersConfig};
use crate::constants::{DEFAULT_ARCHIVE_CAPACITY, ORCHESTRATOR_ID};
use crate::errors::ConfigError;
use crate::event::RunEvent;
use crate::llm::LlmClient;
use crate::workers::{UsageMeter, WorkerRegistry, WorkerStats};
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Entry point of the engine: owns the registry and the run loop, and
/// turns every run into a [`RunReport`].
///
/// Runs share nothing mutable but the report archive, so `run` may be
/// called concurrently.
pub struct Orchestrator {
    registry: Arc<WorkerRegistry>,
    run_loop: RunLoop,
    archive: Mutex<ReportArchive>,
    /// Runs, plus the planning and synthesis calls made for them
    usage: Arc<UsageMeter>,
}

impl Orchestrator {
    /// Builds the registry, catalogue and run loop from configuration.
    pub fn new(config: &OrchestraConfig, llm_client: Arc<LlmClient>) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalogue = config.catalogue()?;
        let registry = WorkerRegistry::from_config(config, llm_client.clone())?;
        Self::with_registry(&config.parameters, registry, catalogue, llm_client)
    }

    /// Assembles an orchestrator around an existing registry.
    pub fn with_registry(
        parameters: &ParametersConfig,
        registry: WorkerRegistry,
        catalogue: TemplateCatalogue,
        llm_client: Arc<LlmClient>,
    ) -> Result<Self, ConfigError> {
        if registry.is_empty() {
            return Err(ConfigError::Invalid(
                "no worker is registered".to_string(),
            ));
        }
        if parameters.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "parameters.max_iterations must be at least 1".to_string(),
            ));
        }

        let registry = Arc::new(registry);
        let usage = Arc::new(UsageMeter::default());
        let planner = Planner::new(
            Arc::new(catalogue),
            registry.clone(),
            llm_client.clone(),
            parameters.planner_temperature,
            parameters.max_plan_steps,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))?
        .with_usage(usage.clone());
        let run_loop = RunLoop::new(
            planner,
            StepExecutor::new(registry.clone()),
            Synthesizer::new(
                registry.clone(),
                llm_client,
                parameters.synthesis_max_tokens,
            )
            .with_usage(usage.clone()),
            parameters.max_iterations,
        );

        info!(
            "Orchestrator ready with workers: {}",
            registry
                .kinds()
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self {
            registry,
            run_loop,
            archive: Mutex::new(ReportArchive::new(DEFAULT_ARCHIVE_CAPACITY)),
            usage,
        })
    }

    /// Publishes progress events of every later run on `sender`.
    pub fn with_events(mut self, sender: UnboundedSender<RunEvent>) -> Self {
        self.run_loop.set_events(sender);
        self
    }

    /// Runs one task. Never fails: a run-level error is reported with
    /// `success = false` and the partial state.
    pub async fn run(&self, task: &str, initial_context: Option<Map<String, Value>>) -> RunReport {
        let run_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        info!("Starting run {} for task: {}", run_id, task);
        self.usage.record_execution();

        let mut state = SharedState::new();
        let mut context = initial_context.unwrap_or_default();
        context.insert("task".to_string(), Value::String(task.to_string()));
        state.update_context(context);

        let mut trace = RunTrace::default();
        let (output, error) = match self.run_loop.drive(task, &mut state, &mut trace).await {
            Ok(output) => (Some(output), None),
            Err(e) => {
                error!("Run {} failed: {}", run_id, e);
                (None, Some(e.to_string()))
            }
        };

        let report = RunReport {
            run_id,
            task: task.to_string(),
            success: error.is_none(),
            output,
            error,
            execution_time_seconds: started.elapsed().as_secs_f64(),
            summary: ExecutionSummary::from_run(&trace, &state),
            state: state.export(),
            timestamp: Utc::now(),
        };
        info!(
            "Run {} finished in {:.2}s ({} steps, {} failed)",
            report.run_id,
            report.execution_time_seconds,
            report.summary.steps_executed,
            report.summary.failed_steps
        );

        self.archive.lock().await.push(report.clone());
        report
    }

    /// Reports of the most recent runs, oldest first
    pub async fn history(&self, limit: usize) -> Vec<RunReport> {
        self.archive.lock().await.recent(limit)
    }

    pub async fn clear_history(&self) {
        self.archive.lock().await.clear();
    }

    /// Usage counters of the orchestrator itself, then of every registered worker
    pub fn worker_stats(&self) -> Vec<WorkerStats> {
        std::iter::once(self.usage.stats(ORCHESTRATOR_ID, "Orchestrator"))
            .chain(self.registry.iter().map(|(_, worker)| worker.stats()))
            .collect()
    }

    pub fn reset_stats(&self) {
        self.usage.reset();
        for (_, worker) in self.registry.iter() {
            worker.reset_stats();
        }
    }
}
