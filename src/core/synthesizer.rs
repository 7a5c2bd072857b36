use super::plan::Plan;
use super::shared_state::SharedState;
use super::step_result::StepResult;
use crate::constants::{NO_SUCCESSFUL_OUTPUTS, ORCHESTRATOR_SYSTEM_PROMPT, SYNTHESIS_GUIDELINES};
use crate::errors::GenerationError;
use crate::llm::{ChatMessage, GenerationRequest, LlmClient};
use crate::workers::{UsageMeter, WorkerRegistry};
use std::sync::Arc;
use tracing::{debug, info};

/// Merges the successful outputs of a run into its final answer.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    registry: Arc<WorkerRegistry>,
    llm_client: Arc<LlmClient>,
    max_tokens: u32,
    usage: Arc<UsageMeter>,
}

impl Synthesizer {
    pub fn new(registry: Arc<WorkerRegistry>, llm_client: Arc<LlmClient>, max_tokens: u32) -> Self {
        Self {
            registry,
            llm_client,
            max_tokens,
            usage: Arc::default(),
        }
    }

    /// Counts synthesis calls and their tokens on `usage`.
    pub fn with_usage(mut self, usage: Arc<UsageMeter>) -> Self {
        self.usage = usage;
        self
    }

    /// Produces the final answer from the successful results.
    ///
    /// Without any successful result the fixed sentinel is returned and the
    /// generation service is not called.
    pub async fn synthesize(
        &self,
        task: &str,
        plan: &Plan,
        results: &[StepResult],
        state: &SharedState,
    ) -> Result<String, GenerationError> {
        let outputs: Vec<(&StepResult, &str)> = results
            .iter()
            .filter_map(|r| r.output().map(|o| (r, o)))
            .collect();

        if outputs.is_empty() {
            info!("No successful outputs to synthesize");
            return Ok(NO_SUCCESSFUL_OUTPUTS.to_string());
        }

        let outputs_text: String = outputs
            .iter()
            .map(|(result, output)| {
                format!("**{}**:\n{}\n", self.registry.display_name(result.worker), output)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Original Task: {}\n\n\
             The workers completed a {}-step plan ({} messages exchanged). Their outputs:\n\n\
             {}\n\
             Synthesize these outputs into a comprehensive, coherent final response.\n\n\
             {}",
            task,
            plan.len(),
            state.messages().len(),
            outputs_text,
            SYNTHESIS_GUIDELINES
        );
        debug!("Synthesis prompt: {}", prompt);

        let request = GenerationRequest::new(vec![
            ChatMessage::system(ORCHESTRATOR_SYSTEM_PROMPT),
            ChatMessage::user(&prompt),
        ])
        .with_max_tokens(self.max_tokens);

        info!("Synthesizing {} successful outputs", outputs.len());
        self.usage.record_call();
        let generation = self.llm_client.generate(request).await?;
        self.usage.record_tokens(generation.total_tokens);
        Ok(generation.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlanSource, Step};
    use crate::testing::{stub_registry, ScriptedProvider};
    use crate::workers::{WorkerKind, WorkerOutput};
    use std::sync::atomic::Ordering;

    fn plan() -> Plan {
        Plan::new(
            PlanSource::Default,
            vec![
                Step::new(WorkerKind::Research, "a"),
                Step::new(WorkerKind::Writing, "b"),
            ],
        )
    }

    #[tokio::test]
    async fn no_successful_results_returns_sentinel_without_call() {
        let provider = ScriptedProvider::new(vec!["should not be used"]);
        let calls = provider.calls();
        let synthesizer = Synthesizer::new(
            Arc::new(stub_registry()),
            Arc::new(LlmClient::from_provider(Box::new(provider))),
            2000,
        );

        let results = vec![
            StepResult::failure(WorkerKind::Research, "offline"),
            StepResult::failure(WorkerKind::Writing, "offline"),
        ];
        let output = synthesizer
            .synthesize("task", &plan(), &results, &SharedState::new())
            .await
            .unwrap();

        assert_eq!(output, NO_SUCCESSFUL_OUTPUTS);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_outputs_are_headed_by_display_name() {
        let provider = ScriptedProvider::new(vec!["final answer"]).with_tokens(300);
        let requests = provider.requests();
        let usage = Arc::new(UsageMeter::default());
        let synthesizer = Synthesizer::new(
            Arc::new(stub_registry()),
            Arc::new(LlmClient::from_provider(Box::new(provider))),
            1234,
        )
        .with_usage(usage.clone());

        let results = vec![
            StepResult::success(WorkerKind::Research, WorkerOutput::new("the facts")),
            StepResult::failure(WorkerKind::Writing, "offline"),
        ];
        let output = synthesizer
            .synthesize("explain tides", &plan(), &results, &SharedState::new())
            .await
            .unwrap();
        assert_eq!(output, "final answer");
        assert_eq!(usage.stats("orchestrator", "Orchestrator").total_tokens, 300);

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].max_tokens, Some(1234));
        let prompt = &sent[0].messages[1].content;
        assert!(prompt.contains("Original Task: explain tides"));
        assert!(prompt.contains("**Research Worker**:\nthe facts\n"));
        assert!(!prompt.contains("Writing Worker"));
    }

    #[tokio::test]
    async fn generation_failure_is_propagated() {
        let synthesizer = Synthesizer::new(
            Arc::new(stub_registry()),
            Arc::new(LlmClient::from_provider(Box::new(ScriptedProvider::failing(
                "quota exceeded",
            )))),
            2000,
        );
        let results = vec![StepResult::success(
            WorkerKind::Research,
            WorkerOutput::new("x"),
        )];

        let err = synthesizer
            .synthesize("task", &plan(), &results, &SharedState::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
