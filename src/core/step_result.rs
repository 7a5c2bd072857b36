use crate::workers::{WorkerKind, WorkerOutput};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a step produced: either an output or the reason it has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        output: String,
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    Failure {
        error: String,
    },
}

/// Result of executing one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub worker: WorkerKind,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,
}

impl StepResult {
    pub fn success(worker: WorkerKind, output: WorkerOutput) -> Self {
        Self {
            worker,
            outcome: Outcome::Success {
                output: output.output,
                metadata: output.metadata,
            },
            timestamp: Utc::now(),
        }
    }

    /// A failed step; an empty reason is replaced so the error is never blank.
    pub fn failure(worker: WorkerKind, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "unknown error".to_string();
        }
        Self {
            worker,
            outcome: Outcome::Failure { error },
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn output(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { output, .. } => Some(output),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { error } => Some(error),
        }
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        match &self.outcome {
            Outcome::Success { metadata, .. } => Some(metadata),
            Outcome::Failure { .. } => None,
        }
    }
}
