//! Orchestra routes a natural-language task through specialized workers
//! (research, code, data, writing, QA) and merges their outputs into one
//! answer.
//!
//! The [`core::Orchestrator`] is the entry point: it plans the task, runs
//! the plan step by step against the [`workers::WorkerRegistry`] and
//! synthesizes the final output into a [`core::RunReport`].

pub mod config;
pub mod constants;
pub mod core;
pub mod errors;
pub mod event;
pub mod llm;
pub mod utils;
pub mod workers;

#[cfg(test)]
pub(crate) mod testing;
