//! Pipeline execution

pub mod engine;
pub mod runner;

pub use engine::{EventHandler, ExecutionEngine, ExecutionEvent, ExitOutcome};
pub use runner::{CommandRunner, ProcessRunner, RunError};
