use super::{PromptWorker, Worker, WorkerKind, WorkerOutput, WorkerProfile, WorkerStats};
use crate::constants::CODE_REQUIREMENTS;
use crate::core::StateHandle;
use crate::errors::WorkerError;
use crate::llm::LlmClient;
use crate::utils::extract_code_block;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Language fence the code worker asks for and extracts.
const CODE_LANGUAGE: &str = "python";

/// Generates code and stores it as `generated_code` in the shared context.
#[derive(Debug)]
pub struct CodeWorker {
    base: PromptWorker,
}

impl CodeWorker {
    pub fn new(profile: WorkerProfile, llm_client: Arc<LlmClient>) -> Self {
        Self {
            base: PromptWorker::new(WorkerKind::Code, profile, llm_client),
        }
    }
}

#[async_trait]
impl Worker for CodeWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Code
    }

    fn profile(&self) -> &WorkerProfile {
        &self.base.profile
    }

    async fn execute(
        &self,
        instruction: &str,
        state: &mut StateHandle<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        info!("{}: Starting code task", self.base.profile.name);
        self.base.record_execution();

        let prompt = format!(
            "Generate clean, well-documented {} code for this task:\n\n{}\n\n{}",
            CODE_LANGUAGE, instruction, CODE_REQUIREMENTS
        );
        let messages = self.base.build_messages(&prompt, Some(state.context()));
        let response = self.base.call(messages, None, 2000).await?;

        let code = extract_code_block(&response, CODE_LANGUAGE);
        if code.is_empty() {
            return Err(WorkerError::Execution(
                "no code in generation response".to_string(),
            ));
        }

        state.set_context("generated_code", json!(code));

        let output = format!(
            "**Generated Code:**\n```{}\n{}\n```\n",
            CODE_LANGUAGE, code
        );
        Ok(WorkerOutput::new(output)
            .with_metadata("language", CODE_LANGUAGE)
            .with_metadata("lines", code.lines().count()))
    }

    fn stats(&self) -> WorkerStats {
        self.base.stats()
    }

    fn reset_stats(&self) {
        self.base.reset_stats()
    }
}
