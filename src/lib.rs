//! spreader-tasks - build and test tooling for the spreader JavaScript package

pub mod cli;
pub mod core;
pub mod execution;

// Re-export commonly used types
pub use crate::core::{ConfigError, EnvResolver, Pipeline, PipelineStep, ProcessEnvironment, StepState, ExecutionStatus};
pub use crate::execution::{CommandRunner, ExecutionEngine, ExecutionEvent, ExitOutcome, ProcessRunner, RunError};
