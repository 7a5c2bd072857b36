//! Test doubles for the generation service and for workers.

use crate::core::StateHandle;
use crate::errors::{GenerationError, WorkerError};
use crate::llm::{Generation, GenerationRequest, LlmClient, LlmProvider};
use crate::workers::{
    UsageMeter, Worker, WorkerKind, WorkerOutput, WorkerProfile, WorkerRegistry, WorkerStats,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Reply used once the scripted queue is exhausted
pub const DEFAULT_REPLY: &str = "scripted reply";

/// Provider answering from a queue of canned responses, or always failing.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<String>>,
    failure: Option<String>,
    tokens: u64,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(str::to_string).collect()),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Token usage reported with every successful reply
    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens = tokens;
        self
    }

    /// Shared counter of calls received
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Shared log of requests received
    pub fn requests(&self) -> Arc<Mutex<Vec<GenerationRequest>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn call_llm_api(
        &self,
        request: GenerationRequest,
    ) -> Result<Generation, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if let Some(message) = &self.failure {
            return Err(GenerationError::Other(message.clone()));
        }
        let text = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| DEFAULT_REPLY.to_string());
        Ok(Generation::new(text).with_tokens(self.tokens))
    }
}

pub fn scripted_client(responses: Vec<&str>) -> Arc<LlmClient> {
    Arc::new(LlmClient::from_provider(Box::new(ScriptedProvider::new(
        responses,
    ))))
}

/// Worker with a fixed reply or a fixed error.
#[derive(Debug)]
pub struct StubWorker {
    kind: WorkerKind,
    profile: WorkerProfile,
    reply: Result<String, String>,
    context_key: Option<String>,
    seen_iterations: Arc<Mutex<Vec<usize>>>,
    usage: UsageMeter,
}

impl StubWorker {
    pub fn replying(kind: WorkerKind, output: &str) -> Self {
        Self::with_reply(kind, Ok(output.to_string()))
    }

    pub fn failing(kind: WorkerKind, error: &str) -> Self {
        Self::with_reply(kind, Err(error.to_string()))
    }

    fn with_reply(kind: WorkerKind, reply: Result<String, String>) -> Self {
        Self {
            kind,
            profile: WorkerProfile::builtin(kind),
            reply,
            context_key: None,
            seen_iterations: Arc::default(),
            usage: UsageMeter::default(),
        }
    }

    /// Also stores the reply in the shared context under `key`
    pub fn writing_context(mut self, key: &str) -> Self {
        self.context_key = Some(key.to_string());
        self
    }

    /// Iteration counter values observed by each execution
    pub fn seen_iterations(&self) -> Arc<Mutex<Vec<usize>>> {
        self.seen_iterations.clone()
    }
}

#[async_trait]
impl Worker for StubWorker {
    fn kind(&self) -> WorkerKind {
        self.kind
    }

    fn profile(&self) -> &WorkerProfile {
        &self.profile
    }

    async fn execute(
        &self,
        _instruction: &str,
        state: &mut StateHandle<'_>,
    ) -> Result<WorkerOutput, WorkerError> {
        self.usage.record_execution();
        self.seen_iterations.lock().unwrap().push(state.iteration());
        match &self.reply {
            Ok(output) => {
                if let Some(key) = &self.context_key {
                    state.set_context(key, Value::String(output.clone()));
                }
                Ok(WorkerOutput::new(output.as_str()).with_metadata("stub", true))
            }
            Err(error) => Err(WorkerError::Execution(error.clone())),
        }
    }

    fn stats(&self) -> WorkerStats {
        self.usage.stats(self.kind.as_str(), &self.profile.name)
    }

    fn reset_stats(&self) {
        self.usage.reset();
    }
}

/// Registry with a replying stub for every worker kind
pub fn stub_registry() -> WorkerRegistry {
    WorkerKind::ALL
        .into_iter()
        .fold(WorkerRegistry::new(), |registry, kind| {
            registry.with(Arc::new(StubWorker::replying(kind, kind.as_str())))
        })
}
