use super::{context_text, PromptWorker, Worker, WorkerKind, WorkerOutput, WorkerProfile, WorkerStats};
use crate::constants::{QA_CHECKLIST, QA_NOTHING_TO_REVIEW, QA_REVIEW_EXCERPT_CHARS};
use crate::core::StateHandle;
use crate::errors::WorkerError;
use crate::llm::LlmClient;
use crate::utils::truncate_chars;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Context entries reviewed by the QA worker, with their headings.
const REVIEWED_OUTPUTS: [(&str, &str); 4] = [
    ("research", "research_results"),
    ("analysis", "data_analysis"),
    ("code", "generated_code"),
    ("writing", "written_content"),
];

/// Reviews the outputs of earlier workers and stores the review as `qa_results`.
#[derive(Debug)]
pub struct QaWorker {
    base: PromptWorker,
}

impl QaWorker {
    pub fn new(profile: WorkerProfile, llm_client: Arc<LlmClient>) -> Self {
        Self {
            base: PromptWorker::new(WorkerKind::Qa, profile, llm_client),
        }
    }
}

#[async_trait]
impl Worker for QaWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::Qa
    }

    fn profile(&self) -> &WorkerProfile {
        &self.base.profile
    }

    async fn execute(
        &self,
        instruction: &str,
        state: &mut StateHandle<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        info!("{}: Starting QA review", self.base.profile.name);
        self.base.record_execution();

        let outputs: Vec<(&str, String)> = REVIEWED_OUTPUTS
            .iter()
            .filter_map(|(label, key)| context_text(state.context(), key).map(|v| (*label, v)))
            .collect();

        if outputs.is_empty() {
            return Ok(WorkerOutput::new(QA_NOTHING_TO_REVIEW));
        }

        let mut review_content = String::new();
        for (label, output) in &outputs {
            review_content.push_str(&format!("**{} Output:**\n", capitalize(label)));
            review_content.push_str(&truncate_chars(output, QA_REVIEW_EXCERPT_CHARS));
            review_content.push_str("\n\n");
        }

        let task = state
            .get("task")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(instruction);
        let mut prompt = format!(
            "Review the following worker outputs for quality and completeness.\n\n\
             Original Task: {}\n",
            task
        );
        if task != instruction {
            prompt.push_str(&format!("Review Focus: {}\n", instruction));
        }
        prompt.push_str(&format!(
            "\nWorker Outputs:\n{}{}",
            review_content, QA_CHECKLIST
        ));
        let messages = self.base.build_messages(&prompt, Some(state.context()));
        let review = self.base.call(messages, None, 1500).await?;

        state.set_context("qa_results", json!(review));

        let reviewed: Vec<&str> = outputs.iter().map(|(label, _)| *label).collect();
        let issues = review.matches("Issue:").count();
        Ok(WorkerOutput::new(review)
            .with_metadata("reviewed_outputs", reviewed)
            .with_metadata("issues_found", issues))
    }

    fn stats(&self) -> WorkerStats {
        self.base.stats()
    }

    fn reset_stats(&self) {
        self.base.reset_stats()
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SharedState;
    use crate::testing::ScriptedProvider;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn nothing_to_review_skips_generation() {
        let provider = ScriptedProvider::new(vec![]);
        let calls = provider.calls();
        let worker = QaWorker::new(
            WorkerProfile::builtin(WorkerKind::Qa),
            Arc::new(LlmClient::from_provider(Box::new(provider))),
        );
        let mut state = SharedState::new();

        let output = worker.execute("review", &mut state.handle()).await.unwrap();
        assert_eq!(output.output, QA_NOTHING_TO_REVIEW);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn counts_issues_and_lists_reviewed_outputs() {
        let provider = ScriptedProvider::new(vec!["Issue: missing tests\nIssue: typo\nPass"]);
        let worker = QaWorker::new(
            WorkerProfile::builtin(WorkerKind::Qa),
            Arc::new(LlmClient::from_provider(Box::new(provider))),
        );
        let mut state = SharedState::new();
        let mut handle = state.handle();
        handle.set_context("generated_code", json!("fn main() {}"));
        handle.set_context("written_content", json!("Docs"));

        let output = worker.execute("review", &mut handle).await.unwrap();
        assert_eq!(output.metadata["issues_found"], json!(2));
        assert_eq!(output.metadata["reviewed_outputs"], json!(["code", "writing"]));
        assert!(state.context().contains_key("qa_results"));
    }

    #[tokio::test]
    async fn reviews_against_the_run_task() {
        let provider = ScriptedProvider::new(vec!["Final Assessment: Pass"]);
        let requests = provider.requests();
        let worker = QaWorker::new(
            WorkerProfile::builtin(WorkerKind::Qa),
            Arc::new(LlmClient::from_provider(Box::new(provider))),
        );
        let mut state = SharedState::new();
        let mut handle = state.handle();
        handle.set_context("task", json!("Build a REST API for a todo app"));
        handle.set_context("generated_code", json!("fn main() {}"));

        worker.execute("code_review", &mut handle).await.unwrap();

        let sent = requests.lock().unwrap();
        let prompt = &sent[0].messages.last().unwrap().content;
        assert!(prompt.contains("Original Task: Build a REST API for a todo app\n"));
        assert!(prompt.contains("Review Focus: code_review"));
        assert!(sent[0].messages[1].content.starts_with("Context:\n"));
    }
}
