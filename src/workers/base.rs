use super::{UsageMeter, WorkerKind, WorkerProfile, WorkerStats};
use crate::errors::GenerationError;
use crate::llm::{ChatMessage, GenerationRequest, LlmClient};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

/// Shared plumbing of the prompt-building workers: profile, generation
/// client and usage counters.
#[derive(Debug)]
pub struct PromptWorker {
    pub kind: WorkerKind,
    pub profile: WorkerProfile,
    llm_client: Arc<LlmClient>,
    usage: UsageMeter,
}

impl PromptWorker {
    pub fn new(kind: WorkerKind, profile: WorkerProfile, llm_client: Arc<LlmClient>) -> Self {
        Self {
            kind,
            profile,
            llm_client,
            usage: UsageMeter::default(),
        }
    }

    /// Builds the conversation for one request: the worker's system prompt,
    /// the non-empty entries of `context` as a second system message, then
    /// the prompt itself.
    pub fn build_messages(&self, prompt: &str, context: Option<&Map<String, Value>>) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(&self.profile.system_prompt)];

        if let Some(context) = context {
            let context_str = context
                .iter()
                .filter(|(_, v)| !is_blank(v))
                .map(|(k, v)| format!("{}: {}", k, render_value(v)))
                .collect::<Vec<_>>()
                .join("\n");
            if !context_str.is_empty() {
                messages.push(ChatMessage::system(&format!("Context:\n{}", context_str)));
            }
        }

        messages.push(ChatMessage::user(prompt));
        messages
    }

    /// Submits a conversation with the worker's default temperature unless
    /// one is given, and counts the tokens it consumed.
    pub async fn call(
        &self,
        messages: Vec<ChatMessage>,
        temperature: Option<f32>,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        info!(
            "{}: Calling LLM with {} messages",
            self.profile.name,
            messages.len()
        );
        self.usage.record_call();
        let request = GenerationRequest::new(messages)
            .with_temperature(temperature.unwrap_or(self.profile.temperature))
            .with_max_tokens(max_tokens);
        let generation = self.llm_client.generate(request).await?;
        let total = self.usage.record_tokens(generation.total_tokens);
        info!(
            "{}: Used {} tokens (Total: {})",
            self.profile.name, generation.total_tokens, total
        );
        Ok(generation.text)
    }

    pub fn record_execution(&self) {
        self.usage.record_execution();
    }

    pub fn stats(&self) -> WorkerStats {
        self.usage.stats(self.kind.as_str(), &self.profile.name)
    }

    pub fn reset_stats(&self) {
        self.usage.reset();
        info!("{}: Statistics reset", self.profile.name);
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(_) => false,
    }
}

/// Strings are rendered raw, everything else as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reads a context entry as text, treating absent and blank entries alike.
pub fn context_text(context: &Map<String, Value>, key: &str) -> Option<String> {
    context
        .get(key)
        .filter(|v| !is_blank(v))
        .map(render_value)
}
