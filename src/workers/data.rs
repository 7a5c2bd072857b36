use super::{context_text, PromptWorker, Worker, WorkerKind, WorkerOutput, WorkerProfile, WorkerStats};
use crate::core::StateHandle;
use crate::errors::WorkerError;
use crate::llm::LlmClient;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Analyzes the data handed in through the shared context (`data` or
/// `data_file`) and stores the analysis as `data_analysis`.
#[derive(Debug)]
pub struct DataWorker {
    base: PromptWorker,
}

impl DataWorker {
    pub fn new(profile: WorkerProfile, llm_client: Arc<LlmClient>) -> Self {
        Self {
            base: PromptWorker::new(WorkerKind::Data, profile, llm_client),
        }
    }
}

#[async_trait]
impl Worker for DataWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Data
    }

    fn profile(&self) -> &WorkerProfile {
        &self.base.profile
    }

    async fn execute(
        &self,
        instruction: &str,
        state: &mut StateHandle<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        info!("{}: Starting data analysis", self.base.profile.name);
        self.base.record_execution();

        let data = context_text(state.context(), "data");
        let data_file = context_text(state.context(), "data_file");

        let source = match (&data, &data_file) {
            (Some(data), _) => format!("Dataset:\n{}", data),
            (None, Some(file)) => format!("Dataset file: {}", file),
            (None, None) => {
                "No dataset was provided; work from the information gathered so far.".to_string()
            }
        };

        let prompt = format!(
            "Perform a data analysis for this task: {}\n\n{}\n\n\
             Provide:\n\
             1. Key statistics\n\
             2. Notable patterns and correlations\n\
             3. Suggested visualizations\n\
             4. Actionable insights",
            instruction, source
        );
        let messages = self.base.build_messages(&prompt, Some(state.context()));
        let analysis = self.base.call(messages, None, 2000).await?;

        state.set_context("data_analysis", json!(analysis));

        Ok(WorkerOutput::new(analysis)
            .with_metadata("has_data", data.is_some() || data_file.is_some()))
    }

    fn stats(&self) -> WorkerStats {
        self.base.stats()
    }

    fn reset_stats(&self) {
        self.base.reset_stats()
    }
}
