use super::plan::Step;
use super::shared_state::{Message, MessageKind, SharedState};
use super::step_result::StepResult;
use crate::constants::ORCHESTRATOR_ID;
use crate::errors::WorkerError;
use crate::workers::WorkerRegistry;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Runs single steps against the worker registry.
///
/// Whatever the worker does, the caller gets a [`StepResult`] back: worker
/// errors become failed results and never cross this boundary.
#[derive(Debug, Clone)]
pub struct StepExecutor {
    registry: Arc<WorkerRegistry>,
}

impl StepExecutor {
    pub fn new(registry: Arc<WorkerRegistry>) -> Self {
        Self { registry }
    }

    /// Executes one step.
    ///
    /// Audit order: outbound task message, execution, result storage (on
    /// success only), inbound result message.
    pub async fn execute_step(&self, step: &Step, state: &mut SharedState) -> StepResult {
        let Some(worker) = self.registry.get(step.worker) else {
            error!("Worker '{}' is not registered", step.worker);
            return StepResult::failure(
                step.worker,
                WorkerError::Unavailable(step.worker).to_string(),
            );
        };

        state.add_message(Message::new(
            ORCHESTRATOR_ID,
            step.worker.as_str(),
            step.instruction.as_str(),
            MessageKind::Task,
        ));
        state.set_current_worker(Some(step.worker));

        info!("Executing step with worker '{}'", step.worker);
        let outcome = worker.execute(&step.instruction, &mut state.handle()).await;
        state.set_current_worker(None);

        let result = match outcome {
            Ok(output) => {
                let result = StepResult::success(step.worker, output);
                state.set_result(step.worker, result.clone());
                result
            }
            Err(e) => {
                error!("Worker '{}' failed: {}", step.worker, e);
                StepResult::failure(step.worker, e.to_string())
            }
        };

        let (content, metadata) = match (result.output(), result.metadata()) {
            (Some(output), Some(metadata)) => (output.to_string(), metadata.clone()),
            _ => {
                let mut metadata = Map::new();
                metadata.insert("success".to_string(), Value::Bool(false));
                (
                    format!("Error: {}", result.error().unwrap_or_default()),
                    metadata,
                )
            }
        };
        state.add_message(
            Message::new(step.worker.as_str(), ORCHESTRATOR_ID, content, MessageKind::Result)
                .with_metadata(metadata),
        );

        result
    }
}
