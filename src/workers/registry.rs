use super::*;
use crate::config::OrchestraConfig;
use crate::errors::GenerationError;
use crate::llm::LlmClient;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Immutable set of workers, built once at start-up and shared by every run.
#[derive(Debug, Clone, Default)]
pub struct WorkerRegistry {
    workers: BTreeMap<WorkerKind, Arc<dyn Worker>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every enabled worker from configuration.
    ///
    /// Workers configured with their own model get a dedicated client on the
    /// configured provider; the others share `llm_client`.
    pub fn from_config(
        config: &OrchestraConfig,
        llm_client: Arc<LlmClient>,
    ) -> Result<Self, GenerationError> {
        let mut registry = Self::new();
        for kind in WorkerKind::ALL {
            let worker_config = config.workers.get(kind);
            if !worker_config.enabled {
                info!("Worker '{}' disabled by configuration", kind);
                continue;
            }

            let client = match &worker_config.model {
                Some(model) => Arc::new(LlmClient::new(&config.parameters.llm_provider, model)?),
                None => llm_client.clone(),
            };
            let profile = WorkerProfile::from_config(kind, worker_config);
            let worker: Arc<dyn Worker> = match kind {
                WorkerKind::Research => Arc::new(ResearchWorker::new(profile, client)),
                WorkerKind::Code => Arc::new(CodeWorker::new(profile, client)),
                WorkerKind::Data => Arc::new(DataWorker::new(profile, client)),
                WorkerKind::Writing => Arc::new(WritingWorker::new(profile, client)),
                WorkerKind::Qa => Arc::new(QaWorker::new(profile, client)),
            };
            registry.register(worker);
        }
        info!("Registry initialized with {} workers", registry.len());
        Ok(registry)
    }

    /// Adds a worker under its own kind, replacing any previous one.
    pub fn register(&mut self, worker: Arc<dyn Worker>) {
        self.workers.insert(worker.kind(), worker);
    }

    pub fn with(mut self, worker: Arc<dyn Worker>) -> Self {
        self.register(worker);
        self
    }

    pub fn get(&self, kind: WorkerKind) -> Option<&Arc<dyn Worker>> {
        self.workers.get(&kind)
    }

    pub fn contains(&self, kind: WorkerKind) -> bool {
        self.workers.contains_key(&kind)
    }

    /// Registered kinds, in kind order
    pub fn kinds(&self) -> Vec<WorkerKind> {
        self.workers.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WorkerKind, &Arc<dyn Worker>)> {
        self.workers.iter()
    }

    /// Display name of a worker, falling back to its identifier
    pub fn display_name(&self, kind: WorkerKind) -> String {
        self.get(kind)
            .map(|w| w.profile().name.clone())
            .unwrap_or_else(|| kind.to_string())
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
