use crate::workers::WorkerKind;

/// Failure of the external text-generation service.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),
    #[error("Unknown provider '{0}'")]
    UnknownProvider(String),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("No content in {0} LLM response")]
    EmptyResponse(&'static str),
    #[error("{0}")]
    Other(String),
}

/// The planner could not interpret a generated plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanParseError {
    #[error("Invalid plan JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Unexpected plan shape: {0}")]
    Shape(String),
}

/// Failure local to a single step.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("worker not available: {0}")]
    Unavailable(WorkerKind),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("{0}")]
    Execution(String),
}

/// Failure of the run itself; the only errors that produce a failed report.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("LLM provider error: {0}")]
    Provider(#[from] GenerationError),
}
