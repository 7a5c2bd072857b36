use super::executor::StepExecutor;
use super::plan::Plan;
use super::planner::Planner;
use super::shared_state::SharedState;
use super::step_result::StepResult;
use super::synthesizer::Synthesizer;
use crate::errors::RunError;
use crate::event::RunEvent;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Phases of one run. There are no retries and no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Planning,
    Executing(usize),
    Synthesizing,
    Done,
}

impl RunPhase {
    /// Phase entered after planning, or after the step at `index - 1`
    /// moved the counter to `iteration`.
    ///
    /// The ceiling wins over remaining steps.
    pub fn next(index: usize, plan_len: usize, iteration: usize, ceiling: usize) -> RunPhase {
        if iteration >= ceiling || index >= plan_len {
            RunPhase::Synthesizing
        } else {
            RunPhase::Executing(index)
        }
    }
}

/// What a run accumulated, kept even when the run fails part way.
#[derive(Debug, Clone, Default)]
pub struct RunTrace {
    pub plan: Option<Plan>,
    pub results: Vec<StepResult>,
}

impl RunTrace {
    pub fn failed_steps(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}

/// Drives a task from planning to its synthesized answer.
pub struct RunLoop {
    planner: Planner,
    executor: StepExecutor,
    synthesizer: Synthesizer,
    max_iterations: usize,
    events: Option<UnboundedSender<RunEvent>>,
}

impl RunLoop {
    pub fn new(
        planner: Planner,
        executor: StepExecutor,
        synthesizer: Synthesizer,
        max_iterations: usize,
    ) -> Self {
        Self {
            planner,
            executor,
            synthesizer,
            max_iterations,
            events: None,
        }
    }

    /// Publishes progress on `sender` for every later run.
    pub fn set_events(&mut self, sender: UnboundedSender<RunEvent>) {
        self.events = Some(sender);
    }

    fn emit(&self, event: RunEvent) {
        if let Some(sender) = &self.events {
            // a dropped receiver only means nobody is watching
            let _ = sender.send(event);
        }
    }

    /// Runs `task` to completion and returns the final answer.
    ///
    /// Failed steps never stop the loop; only a failing synthesis (or an
    /// internal inconsistency) ends it with an error. `trace` holds the
    /// plan and every step result either way.
    pub async fn drive(
        &self,
        task: &str,
        state: &mut SharedState,
        trace: &mut RunTrace,
    ) -> Result<String, RunError> {
        let mut phase = RunPhase::Planning;
        let mut output = None;

        loop {
            phase = match phase {
                RunPhase::Planning => {
                    let plan = self.planner.plan(task, state).await;
                    info!("Plan ready: {} steps ({:?})", plan.len(), plan.source);
                    self.emit(RunEvent::PlanReady(plan.clone()));
                    let next = RunPhase::next(0, plan.len(), state.iteration(), self.max_iterations);
                    trace.plan = Some(plan);
                    next
                }
                RunPhase::Executing(index) => {
                    let plan = trace
                        .plan
                        .as_ref()
                        .ok_or_else(|| RunError::Internal("executing without a plan".to_string()))?;
                    let step = plan.steps.get(index).ok_or_else(|| {
                        RunError::Internal(format!("step {} is outside the plan", index))
                    })?;
                    let total = plan.len();

                    self.emit(RunEvent::StepStarted {
                        index,
                        total,
                        worker: step.worker,
                        instruction: step.instruction.clone(),
                    });
                    let result = self.executor.execute_step(step, state).await;
                    if let Some(error) = result.error() {
                        warn!("Step {} ({}) failed: {}", index + 1, step.worker, error);
                    }
                    self.emit(RunEvent::StepFinished {
                        index,
                        worker: result.worker,
                        error: result.error().map(str::to_string),
                    });
                    trace.results.push(result);

                    let iteration = state.advance_iteration();
                    let next = RunPhase::next(index + 1, total, iteration, self.max_iterations);
                    if next == RunPhase::Synthesizing && index + 1 < total {
                        warn!(
                            "Iteration ceiling {} reached, skipping {} remaining steps",
                            self.max_iterations,
                            total - index - 1
                        );
                        self.emit(RunEvent::IterationCeiling {
                            executed: iteration,
                            remaining: total - index - 1,
                        });
                    }
                    next
                }
                RunPhase::Synthesizing => {
                    let plan = trace
                        .plan
                        .as_ref()
                        .ok_or_else(|| RunError::Internal("synthesizing without a plan".to_string()))?;
                    let successful = trace.results.iter().filter(|r| r.is_success()).count();
                    self.emit(RunEvent::Synthesizing { successful });
                    output = Some(
                        self.synthesizer
                            .synthesize(task, plan, &trace.results, state)
                            .await?,
                    );
                    RunPhase::Done
                }
                RunPhase::Done => break,
            };
        }

        output.ok_or_else(|| RunError::Internal("run finished without output".to_string()))
    }
}
