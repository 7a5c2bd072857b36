mod parser;
use serde::{Deserialize, Serialize};

pub use parser::load_config;

use crate::constants::*;
use crate::core::{TemplateCatalogue, WorkflowTemplate};
use crate::errors::ConfigError;
use crate::workers::WorkerKind;

/// Main configuration structure of the engine
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OrchestraConfig {
    /// Global parameters for task execution
    #[serde(default)]
    pub parameters: ParametersConfig,
    /// Per-worker overrides
    #[serde(default)]
    pub workers: WorkersConfig,
    /// Workflow templates replacing the built-in catalogue when present
    #[serde(default)]
    pub templates: Option<Vec<WorkflowTemplate>>,
}

/// Global parameters for task execution
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct ParametersConfig {
    /// Name/identifier of the LLM provider to use
    pub llm_provider: String,
    /// Name/identifier of the LLM model to use
    pub llm_model: String,
    /// Maximum number of steps executed in one run
    pub max_iterations: usize,
    /// Sampling temperature of the plan generation request
    pub planner_temperature: f32,
    /// Output budget of the synthesis request
    pub synthesis_max_tokens: u32,
    /// Maximum number of steps kept from a generated plan
    pub max_plan_steps: usize,
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            llm_provider: "openai".to_string(),
            llm_model: "gpt-4".to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            planner_temperature: DEFAULT_PLANNER_TEMPERATURE,
            synthesis_max_tokens: DEFAULT_SYNTHESIS_MAX_TOKENS,
            max_plan_steps: DEFAULT_MAX_PLAN_STEPS,
        }
    }
}

/// Configuration for the different workers
#[derive(Debug, Deserialize, Default, Clone, Serialize)]
pub struct WorkersConfig {
    #[serde(default)]
    pub research: WorkerConfig,
    #[serde(default)]
    pub code: WorkerConfig,
    #[serde(default)]
    pub data: WorkerConfig,
    #[serde(default)]
    pub writing: WorkerConfig,
    #[serde(default)]
    pub qa: WorkerConfig,
}

impl WorkersConfig {
    pub fn get(&self, kind: WorkerKind) -> &WorkerConfig {
        match kind {
            WorkerKind::Research => &self.research,
            WorkerKind::Code => &self.code,
            WorkerKind::Data => &self.data,
            WorkerKind::Writing => &self.writing,
            WorkerKind::Qa => &self.qa,
        }
    }
}

/// Configuration for a specific worker
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Display name
    pub name: Option<String>,
    /// Role description offered to the planner
    pub role: Option<String>,
    /// Optional system prompt for the worker
    pub system_prompt: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Model used by this worker instead of the global one
    pub model: Option<String>,
    /// Whether the worker is registered at all
    pub enabled: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: None,
            role: None,
            system_prompt: None,
            temperature: None,
            model: None,
            enabled: true,
        }
    }
}

impl OrchestraConfig {
    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = &self.parameters;
        if params.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "parameters.max_iterations must be at least 1".to_string(),
            ));
        }
        if params.max_plan_steps < 2 {
            return Err(ConfigError::Invalid(
                "parameters.max_plan_steps must be at least 2".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&params.planner_temperature) {
            return Err(ConfigError::Invalid(
                "parameters.planner_temperature must be within 0.0..=2.0".to_string(),
            ));
        }
        for kind in WorkerKind::ALL {
            if let Some(t) = self.workers.get(kind).temperature {
                if !(0.0..=2.0).contains(&t) {
                    return Err(ConfigError::Invalid(format!(
                        "workers.{}.temperature must be within 0.0..=2.0",
                        kind
                    )));
                }
            }
        }
        if !WorkerKind::ALL
            .iter()
            .any(|kind| self.workers.get(*kind).enabled)
        {
            return Err(ConfigError::Invalid(
                "at least one worker must be enabled".to_string(),
            ));
        }
        self.catalogue().map(|_| ())
    }

    /// The configured template catalogue, or the built-in one.
    pub fn catalogue(&self) -> Result<TemplateCatalogue, ConfigError> {
        match &self.templates {
            Some(templates) => TemplateCatalogue::new(templates.clone()),
            None => TemplateCatalogue::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        let config = OrchestraConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.parameters.max_iterations, 10);
        assert!(config.workers.get(WorkerKind::Qa).enabled);
    }

    #[test]
    fn rejects_zero_iterations_and_no_workers() {
        let mut config = OrchestraConfig::default();
        config.parameters.max_iterations = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = OrchestraConfig::default();
        config.workers.research.enabled = false;
        config.workers.code.enabled = false;
        config.workers.data.enabled = false;
        config.workers.writing.enabled = false;
        config.workers.qa.enabled = false;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let mut config = OrchestraConfig::default();
        config.workers.writing.temperature = Some(3.5);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
