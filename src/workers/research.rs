use super::{PromptWorker, Worker, WorkerKind, WorkerOutput, WorkerProfile, WorkerStats};
use crate::core::StateHandle;
use crate::errors::WorkerError;
use crate::llm::LlmClient;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Gathers information and stores it as `research_results` in the shared context.
#[derive(Debug)]
pub struct ResearchWorker {
    base: PromptWorker,
}

impl ResearchWorker {
    pub fn new(profile: WorkerProfile, llm_client: Arc<LlmClient>) -> Self {
        Self {
            base: PromptWorker::new(WorkerKind::Research, profile, llm_client),
        }
    }
}

#[async_trait]
impl Worker for ResearchWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Research
    }

    fn profile(&self) -> &WorkerProfile {
        &self.base.profile
    }

    async fn execute(
        &self,
        instruction: &str,
        state: &mut StateHandle<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        info!("{}: Starting research task", self.base.profile.name);
        self.base.record_execution();

        let prompt = format!(
            "Research the following and report your findings: {}\n\n\
             Organize the findings by topic, state how confident you are in each \
             and list the sources you relied on at the end under a 'Sources:' heading.",
            instruction
        );
        let messages = self.base.build_messages(&prompt, Some(state.context()));
        let findings = self.base.call(messages, None, 2000).await?;

        let sources = findings
            .split_once("Sources:")
            .map(|(_, list)| list.lines().filter(|l| !l.trim().is_empty()).count())
            .unwrap_or(0);

        state.set_context("research_results", json!(findings));

        Ok(WorkerOutput::new(findings)
            .with_metadata("sources_count", sources)
            .with_metadata("instruction", instruction))
    }

    fn stats(&self) -> WorkerStats {
        self.base.stats()
    }

    fn reset_stats(&self) {
        self.base.reset_stats()
    }
}
