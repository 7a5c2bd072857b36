//! Specialized workers and the registry the engine dispatches to.
//!
//! Every worker is a thin prompt builder around one generation call. The
//! engine only knows them through the [`Worker`] trait and the registry key
//! ([`WorkerKind`]); it never inspects a worker beyond that.

mod base;
mod code;
mod data;
mod qa;
mod registry;
mod research;
mod usage;
mod writing;

pub use base::*;
pub use code::*;
pub use data::*;
pub use qa::*;
pub use registry::*;
pub use research::*;
pub use usage::*;
pub use writing::*;

use crate::config::WorkerConfig;
use crate::constants::*;
use crate::core::StateHandle;
use crate::errors::WorkerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Closed set of worker identities; doubles as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Research,
    Code,
    Data,
    Writing,
    Qa,
}

impl WorkerKind {
    pub const ALL: [WorkerKind; 5] = [
        WorkerKind::Research,
        WorkerKind::Code,
        WorkerKind::Data,
        WorkerKind::Writing,
        WorkerKind::Qa,
    ];

    /// Identifier used in plans, configuration and the message log
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerKind::Research => "research",
            WorkerKind::Code => "code",
            WorkerKind::Data => "data",
            WorkerKind::Writing => "writing",
            WorkerKind::Qa => "qa",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "research" => Ok(WorkerKind::Research),
            "code" => Ok(WorkerKind::Code),
            "data" => Ok(WorkerKind::Data),
            "writing" => Ok(WorkerKind::Writing),
            "qa" => Ok(WorkerKind::Qa),
            other => Err(format!("unknown worker '{}'", other)),
        }
    }
}

/// Descriptive and sampling settings of a worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerProfile {
    /// Display name, used as the heading of the worker's output during synthesis
    pub name: String,
    /// One-line role description offered to the planner
    pub role: String,
    pub system_prompt: String,
    pub temperature: f32,
}

impl WorkerProfile {
    /// Built-in profile of a worker kind
    pub fn builtin(kind: WorkerKind) -> Self {
        let (name, role, system_prompt, temperature) = match kind {
            WorkerKind::Research => (
                "Research Worker",
                "Information Gatherer",
                RESEARCH_SYSTEM_PROMPT,
                0.5,
            ),
            WorkerKind::Code => ("Code Worker", "Software Developer", CODE_SYSTEM_PROMPT, 0.2),
            WorkerKind::Data => ("Data Worker", "Data Analyst", DATA_SYSTEM_PROMPT, 0.3),
            WorkerKind::Writing => (
                "Writing Worker",
                "Content Creator",
                WRITING_SYSTEM_PROMPT,
                0.8,
            ),
            WorkerKind::Qa => ("QA Worker", "Quality Assurance", QA_SYSTEM_PROMPT, 0.2),
        };
        Self {
            name: name.to_string(),
            role: role.to_string(),
            system_prompt: system_prompt.to_string(),
            temperature,
        }
    }

    /// Built-in profile with the configured overrides applied
    pub fn from_config(kind: WorkerKind, config: &WorkerConfig) -> Self {
        let mut profile = Self::builtin(kind);
        if let Some(name) = &config.name {
            profile.name = name.clone();
        }
        if let Some(role) = &config.role {
            profile.role = role.clone();
        }
        if let Some(system_prompt) = &config.system_prompt {
            profile.system_prompt = system_prompt.clone();
        }
        if let Some(temperature) = config.temperature {
            profile.temperature = temperature;
        }
        profile
    }
}

/// Successful output of one worker invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerOutput {
    pub output: String,
    pub metadata: Map<String, Value>,
}

impl WorkerOutput {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Usage counters of a worker, or of the orchestrator's own planning and
/// synthesis calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerStats {
    /// Worker identifier, or `orchestrator`
    pub id: String,
    pub name: String,
    pub executions: u64,
    pub generation_calls: u64,
    pub total_tokens: u64,
    pub average_tokens: f64,
}

/// A specialized unit performing one category of step.
///
/// Implementations may read and write the shared context through the
/// handle; the iteration counter is owned by the run loop and is not
/// reachable from here.
#[async_trait]
pub trait Worker: fmt::Debug + Send + Sync {
    fn kind(&self) -> WorkerKind;

    fn profile(&self) -> &WorkerProfile;

    async fn execute(
        &self,
        instruction: &str,
        state: &mut StateHandle<'_>,
    ) -> Result<WorkerOutput, WorkerError>;

    fn stats(&self) -> WorkerStats {
        UsageMeter::default().stats(self.kind().as_str(), &self.profile().name)
    }

    fn reset_stats(&self) {}
}
