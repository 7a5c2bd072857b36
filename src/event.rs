use crate::core::Plan;
use crate::workers::WorkerKind;

/// Progress notifications published while a run executes
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// The planner produced the plan about to be executed
    PlanReady(Plan),

    /// A step is about to be handed to its worker
    StepStarted {
        index: usize,
        total: usize,
        worker: WorkerKind,
        instruction: String,
    },

    /// A step finished; `error` is set when it failed
    StepFinished {
        index: usize,
        worker: WorkerKind,
        error: Option<String>,
    },

    /// The iteration ceiling stopped the run with steps left
    IterationCeiling { executed: usize, remaining: usize },

    /// Successful outputs are being merged into the final answer
    Synthesizing { successful: usize },
}
