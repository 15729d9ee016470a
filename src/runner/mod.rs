//! Step execution orchestration.
//!
//! - [`Orchestrator`] walks the step list and applies the failure policy
//! - [`Session`] runs commands for steps and records what happened
//! - [`RunContext`] holds the counters, audit trail and failures of a run
//! - [`ProcessExecutor`] is the seam to real (or scripted) processes

pub mod context;
pub mod executor;
pub mod gate;
pub mod orchestrator;
pub mod session;

pub use context::{FailureRecord, RunContext};
pub use executor::{ProcessExecutor, ScriptedExecutor, SystemExecutor};
pub use gate::{ask_operator, GateDecision};
pub use orchestrator::{Orchestrator, RunReport, StepRecord};
pub use session::{CommandSpec, Session};
