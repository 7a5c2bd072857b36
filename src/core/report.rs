use super::plan::PlanSource;
use super::run_loop::RunTrace;
use super::shared_state::{SharedState, StateSnapshot};
use crate::constants::ORCHESTRATOR_ID;
use crate::workers::WorkerKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counters describing how a run went
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total_iterations: usize,
    pub plan_source: Option<PlanSource>,
    pub steps_planned: usize,
    pub steps_executed: usize,
    pub failed_steps: usize,
    /// Distinct workers of the plan, in order of first use
    pub workers_used: Vec<WorkerKind>,
    /// Messages sent by each worker; the orchestrator's own are not counted
    pub messages_by_sender: BTreeMap<String, usize>,
    pub messages_exchanged: usize,
    pub results_generated: usize,
}

impl ExecutionSummary {
    pub fn from_run(trace: &RunTrace, state: &SharedState) -> Self {
        let mut messages_by_sender = BTreeMap::new();
        for message in state.messages() {
            if message.sender != ORCHESTRATOR_ID {
                *messages_by_sender.entry(message.sender.clone()).or_insert(0) += 1;
            }
        }

        Self {
            total_iterations: state.iteration(),
            plan_source: trace.plan.as_ref().map(|p| p.source.clone()),
            steps_planned: trace.plan.as_ref().map_or(0, |p| p.len()),
            steps_executed: trace.results.len(),
            failed_steps: trace.failed_steps(),
            workers_used: trace
                .plan
                .as_ref()
                .map(|p| p.distinct_workers())
                .unwrap_or_default(),
            messages_by_sender,
            messages_exchanged: state.messages().len(),
            results_generated: state.results().len(),
        }
    }
}

/// Everything the caller gets back from a run.
///
/// `success` reports whether the pipeline itself completed, independently
/// of how many individual steps failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub task: String,
    pub output: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution_time_seconds: f64,
    pub summary: ExecutionSummary,
    pub state: StateSnapshot,
    pub timestamp: DateTime<Utc>,
}
