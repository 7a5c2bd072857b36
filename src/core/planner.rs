use super::plan::{Plan, PlanSource, Step, TemplateCatalogue, WorkflowTemplate};
use super::shared_state::SharedState;
use crate::constants::{
    DEFAULT_RESEARCH_INSTRUCTION, DEFAULT_WRITING_INSTRUCTION, ORCHESTRATOR_SYSTEM_PROMPT,
};
use crate::errors::PlanParseError;
use crate::llm::{
    build_validator, parse_and_validate, ChatMessage, GenerationRequest, LlmClient, PLAN_SCHEMA,
};
use crate::utils::strip_code_fence;
use crate::workers::{UsageMeter, WorkerKind, WorkerRegistry};
use jsonschema::Validator;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Step as proposed by the generation service, before validation
#[derive(Debug, Deserialize)]
struct ProposedStep {
    #[serde(default, alias = "agent")]
    worker: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Turns a task into an ordered plan whose every step names a registered
/// worker. Nothing downstream re-validates the plan.
pub struct Planner {
    catalogue: Arc<TemplateCatalogue>,
    registry: Arc<WorkerRegistry>,
    llm_client: Arc<LlmClient>,
    temperature: f32,
    max_steps: usize,
    schema: Validator,
    usage: Arc<UsageMeter>,
}

impl Planner {
    pub fn new(
        catalogue: Arc<TemplateCatalogue>,
        registry: Arc<WorkerRegistry>,
        llm_client: Arc<LlmClient>,
        temperature: f32,
        max_steps: usize,
    ) -> Result<Self, PlanParseError> {
        Ok(Self {
            catalogue,
            registry,
            llm_client,
            temperature,
            max_steps,
            schema: build_validator(PLAN_SCHEMA)?,
            usage: Arc::default(),
        })
    }

    /// Counts planning calls and their tokens on `usage`.
    pub fn with_usage(mut self, usage: Arc<UsageMeter>) -> Self {
        self.usage = usage;
        self
    }

    /// Produces the plan for `task`: a matching template if there is one,
    /// otherwise a generated plan. The default plan replaces a template left
    /// without runnable steps and any failed generation.
    ///
    /// Never fails: generation and parse failures fall back to the default
    /// plan.
    pub async fn plan(&self, task: &str, state: &SharedState) -> Plan {
        if let Some(template) = self.catalogue.find_match(task) {
            return self
                .template_plan(template)
                .unwrap_or_else(|| self.default_plan());
        }

        match self.generate_plan(task, state).await {
            Ok(plan) => plan,
            Err(reason) => {
                warn!("Plan generation failed ({}), using default plan", reason);
                self.default_plan()
            }
        }
    }

    fn template_plan(&self, template: &WorkflowTemplate) -> Option<Plan> {
        info!("Using template '{}'", template.id);

        let steps: Vec<Step> = template
            .steps
            .iter()
            .filter(|step| {
                let known = self.registry.contains(step.worker);
                if !known {
                    warn!(
                        "Template '{}' step for unregistered worker '{}' dropped",
                        template.id, step.worker
                    );
                }
                known
            })
            .cloned()
            .collect();

        if steps.is_empty() {
            warn!(
                "Template '{}' has no runnable steps, using default plan",
                template.id
            );
            return None;
        }
        Some(Plan::new(
            PlanSource::Template {
                id: template.id.clone(),
            },
            steps,
        ))
    }

    async fn generate_plan(&self, task: &str, state: &SharedState) -> Result<Plan, String> {
        let messages = vec![
            ChatMessage::system(ORCHESTRATOR_SYSTEM_PROMPT),
            ChatMessage::user(&self.planning_prompt(task, state)),
        ];
        let request = GenerationRequest::new(messages).with_temperature(self.temperature);

        self.usage.record_call();
        let response = self
            .llm_client
            .generate(request)
            .await
            .map_err(|e| e.to_string())?;
        self.usage.record_tokens(response.total_tokens);

        let steps = self.parse_steps(&response.text, task).map_err(|e| e.to_string())?;
        if steps.is_empty() {
            return Err("generated plan has no valid steps".to_string());
        }
        info!("Generated plan with {} steps", steps.len());
        Ok(Plan::new(PlanSource::Generated, steps))
    }

    fn planning_prompt(&self, task: &str, state: &SharedState) -> String {
        let worker_descriptions = self
            .registry
            .iter()
            .map(|(kind, worker)| format!("- {}: {}", kind, worker.profile().role))
            .collect::<Vec<_>>()
            .join("\n");

        let mut prompt = format!(
            "Create an execution plan for this task: {}\n\nAvailable workers:\n{}\n",
            task, worker_descriptions
        );

        let context_keys: Vec<&str> = state
            .context()
            .keys()
            .map(|k| k.as_str())
            .filter(|k| *k != "task")
            .collect();
        if !context_keys.is_empty() {
            prompt.push_str(&format!(
                "\nShared context already available: {}\n",
                context_keys.join(", ")
            ));
        }

        prompt.push_str(&format!(
            "\nCreate a plan with 2-{} steps. Each step should use one worker.\n\n\
             Respond in JSON format:\n\
             [\n    {{\"worker\": \"worker_id\", \"action\": \"what to do\", \"reasoning\": \"why\"}},\n    ...\n]",
            self.max_steps
        ));
        prompt
    }

    /// Parses a generated plan, keeping only steps for registered workers and
    /// at most `max_steps` of them.
    fn parse_steps(&self, response: &str, task: &str) -> Result<Vec<Step>, PlanParseError> {
        let value = parse_and_validate(&self.schema, strip_code_fence(response))?;
        let proposed: Vec<ProposedStep> = serde_json::from_value(value)?;

        let mut steps = Vec::new();
        for proposal in proposed {
            let Some(name) = proposal.worker.as_deref() else {
                debug!("Dropping proposed step without worker");
                continue;
            };
            let kind = match name.parse::<WorkerKind>() {
                Ok(kind) if self.registry.contains(kind) => kind,
                _ => {
                    debug!("Dropping proposed step for unknown worker '{}'", name);
                    continue;
                }
            };
            let instruction = proposal
                .action
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| task.to_string());
            steps.push(Step {
                worker: kind,
                instruction,
                rationale: proposal.reasoning,
            });
        }

        if steps.len() > self.max_steps {
            warn!(
                "Generated plan has {} steps, keeping the first {}",
                steps.len(),
                self.max_steps
            );
            steps.truncate(self.max_steps);
        }
        Ok(steps)
    }

    /// Fixed research → writing plan. A slot whose worker is not registered
    /// is given to the first registered worker instead.
    pub fn default_plan(&self) -> Plan {
        let fallback = self.registry.kinds().first().copied();
        let steps = [
            (WorkerKind::Research, DEFAULT_RESEARCH_INSTRUCTION),
            (WorkerKind::Writing, DEFAULT_WRITING_INSTRUCTION),
        ]
        .into_iter()
        .filter_map(|(kind, instruction)| {
            let worker = if self.registry.contains(kind) {
                Some(kind)
            } else {
                fallback
            };
            worker.map(|w| Step::new(w, instruction))
        })
        .collect();
        Plan::new(PlanSource::Default, steps)
    }
}
