//! Task-routing and plan-execution engine
//!
//! This module contains:
//! - The per-run shared state and step results
//! - Plans, workflow templates and the planner
//! - Step execution, the run loop and synthesis
//! - The orchestrator entry point and its reports

mod archive;
mod executor;
mod orchestrator;
mod plan;
mod planner;
mod report;
mod run_loop;
mod shared_state;
mod step_result;
mod synthesizer;

pub use archive::*;
pub use executor::*;
pub use orchestrator::*;
pub use plan::*;
pub use planner::*;
pub use report::*;
pub use run_loop::*;
pub use shared_state::*;
pub use step_result::*;
pub use synthesizer::*;
