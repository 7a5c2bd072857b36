use super::WorkerStats;
use std::sync::atomic::{AtomicU64, Ordering};

/// Usage counters shared between a component and whoever reports on it.
///
/// Counters only grow until [`UsageMeter::reset`].
#[derive(Debug, Default)]
pub struct UsageMeter {
    executions: AtomicU64,
    generation_calls: AtomicU64,
    total_tokens: AtomicU64,
}

impl UsageMeter {
    pub fn record_execution(&self) {
        self.executions.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a generation call, whether or not it succeeds
    pub fn record_call(&self) {
        self.generation_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds `tokens` and returns the new total
    pub fn record_tokens(&self, tokens: u64) -> u64 {
        self.total_tokens.fetch_add(tokens, Ordering::Relaxed) + tokens
    }

    /// Current counters under `id`; the average is per execution.
    pub fn stats(&self, id: &str, name: &str) -> WorkerStats {
        let executions = self.executions.load(Ordering::Relaxed);
        let total_tokens = self.total_tokens.load(Ordering::Relaxed);
        let average_tokens = if executions == 0 {
            0.0
        } else {
            total_tokens as f64 / executions as f64
        };
        WorkerStats {
            id: id.to_string(),
            name: name.to_string(),
            executions,
            generation_calls: self.generation_calls.load(Ordering::Relaxed),
            total_tokens,
            average_tokens,
        }
    }

    pub fn reset(&self) {
        self.executions.store(0, Ordering::Relaxed);
        self.generation_calls.store(0, Ordering::Relaxed);
        self.total_tokens.store(0, Ordering::Relaxed);
    }
}
