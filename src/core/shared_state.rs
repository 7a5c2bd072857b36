use super::step_result::StepResult;
use crate::workers::WorkerKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Direction of a message in the run log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Instruction sent to a worker
    Task,
    /// Output (or failure) reported back by a worker
    Result,
}

/// One entry of the causal message log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub recipient: String,
    pub content: String,
    pub kind: MessageKind,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
        kind: MessageKind,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            content: content.into(),
            kind,
            metadata: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Audit trail entry, appended by every message and result write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEntry {
    Message {
        data: Message,
    },
    Result {
        worker: WorkerKind,
        data: StepResult,
        timestamp: DateTime<Utc>,
    },
}

/// Per-run mutable record shared by every worker of that run.
///
/// Nothing is ever removed: messages and history only grow, results are
/// overwritten per worker and context keys are last-write-wins. One
/// instance belongs to exactly one run.
#[derive(Debug, Default)]
pub struct SharedState {
    messages: Vec<Message>,
    results: BTreeMap<WorkerKind, StepResult>,
    context: Map<String, Value>,
    history: Vec<HistoryEntry>,
    current_worker: Option<WorkerKind>,
    iteration: usize,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the log and the audit history
    pub fn add_message(&mut self, message: Message) {
        self.history.push(HistoryEntry::Message {
            data: message.clone(),
        });
        self.messages.push(message);
    }

    /// Stores the latest result of a worker, replacing any earlier one
    pub fn set_result(&mut self, worker: WorkerKind, result: StepResult) {
        self.history.push(HistoryEntry::Result {
            worker,
            data: result.clone(),
            timestamp: Utc::now(),
        });
        self.results.insert(worker, result);
    }

    pub fn get_result(&self, worker: WorkerKind) -> Option<&StepResult> {
        self.results.get(&worker)
    }

    /// Shallow merge, last write wins per key
    pub fn update_context(&mut self, updates: Map<String, Value>) {
        for (key, value) in updates {
            self.context.insert(key, value);
        }
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn results(&self) -> &BTreeMap<WorkerKind, StepResult> {
        &self.results
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn current_worker(&self) -> Option<WorkerKind> {
        self.current_worker
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub(crate) fn set_current_worker(&mut self, worker: Option<WorkerKind>) {
        self.current_worker = worker;
    }

    /// Advances the step counter; only the run loop calls this.
    pub(crate) fn advance_iteration(&mut self) -> usize {
        self.iteration += 1;
        self.iteration
    }

    /// The view handed to workers
    pub fn handle(&mut self) -> StateHandle<'_> {
        StateHandle { state: self }
    }

    /// Deep copy of the whole state, for reporting
    pub fn export(&self) -> StateSnapshot {
        StateSnapshot {
            messages: self.messages.clone(),
            results: self.results.clone(),
            context: self.context.clone(),
            history: self.history.clone(),
            current_worker: self.current_worker,
            iteration: self.iteration,
        }
    }
}

/// Worker-facing view of a [`SharedState`]: the context plus a read-only
/// view of the iteration counter. Messages and results stay with the
/// executor.
#[derive(Debug)]
pub struct StateHandle<'a> {
    state: &'a mut SharedState,
}

impl StateHandle<'_> {
    pub fn context(&self) -> &Map<String, Value> {
        &self.state.context
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.context.get(key)
    }

    pub fn set_context(&mut self, key: &str, value: Value) {
        self.state.context.insert(key.to_string(), value);
    }

    pub fn iteration(&self) -> usize {
        self.state.iteration
    }
}

/// Immutable copy of a run's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub messages: Vec<Message>,
    pub results: BTreeMap<WorkerKind, StepResult>,
    pub context: Map<String, Value>,
    pub history: Vec<HistoryEntry>,
    pub current_worker: Option<WorkerKind>,
    pub iteration: usize,
}
