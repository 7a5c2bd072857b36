use super::{context_text, PromptWorker, Worker, WorkerKind, WorkerOutput, WorkerProfile, WorkerStats};
use crate::constants::WRITING_REQUIREMENTS;
use crate::core::StateHandle;
use crate::errors::WorkerError;
use crate::llm::LlmClient;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Turns whatever earlier workers left in the shared context into finished
/// prose, stored as `written_content`.
#[derive(Debug)]
pub struct WritingWorker {
    base: PromptWorker,
}

impl WritingWorker {
    pub fn new(profile: WorkerProfile, llm_client: Arc<LlmClient>) -> Self {
        Self {
            base: PromptWorker::new(WorkerKind::Writing, profile, llm_client),
        }
    }
}

#[async_trait]
impl Worker for WritingWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Writing
    }

    fn profile(&self) -> &WorkerProfile {
        &self.base.profile
    }

    async fn execute(
        &self,
        instruction: &str,
        state: &mut StateHandle<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        info!("{}: Starting writing task", self.base.profile.name);
        self.base.record_execution();

        let research = context_text(state.context(), "research_results");
        let analysis = context_text(state.context(), "data_analysis");
        let code = context_text(state.context(), "generated_code");

        let mut parts = Vec::new();
        if let Some(research) = &research {
            parts.push(format!("Research Findings:\n{}", research));
        }
        if let Some(analysis) = &analysis {
            parts.push(format!("Data Analysis:\n{}", analysis));
        }
        if let Some(code) = &code {
            parts.push(format!("Generated Code:\n```\n{}\n```", code));
        }
        let available = if parts.is_empty() {
            "No additional context.".to_string()
        } else {
            parts.join("\n\n")
        };

        let prompt = format!(
            "Create high-quality content for this task: {}\n\nAvailable Information:\n{}\n\n{}",
            instruction, available, WRITING_REQUIREMENTS
        );
        let messages = self.base.build_messages(&prompt, Some(state.context()));
        let content = self.base.call(messages, None, 2000).await?;

        state.set_context("written_content", json!(content));

        let word_count = content.split_whitespace().count();
        Ok(WorkerOutput::new(content)
            .with_metadata("word_count", word_count)
            .with_metadata("has_research", research.is_some())
            .with_metadata("has_analysis", analysis.is_some()))
    }

    fn stats(&self) -> WorkerStats {
        self.base.stats()
    }

    fn reset_stats(&self) {
        self.base.reset_stats()
    }
}
