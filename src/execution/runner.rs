//! Command runners - spawn the external process behind a step

use crate::core::{PipelineStep, ProcessEnvironment};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Errors that halt a pipeline
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for step {step}: {source}")]
    Wait {
        step: String,
        #[source]
        source: std::io::Error,
    },

    #[error("step {step} exited with code {code}")]
    StepFailed { step: String, code: i32 },

    #[error("step {step} timed out after {limit:?}")]
    Timeout { step: String, limit: Duration },
}

/// Runs a single step to completion - allows substituting a spy in tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the step and return its exit code
    ///
    /// A non-zero exit code is returned as `Ok`; only failures to start or
    /// wait on the process are errors.
    async fn run(&self, step: &PipelineStep) -> Result<i32, RunError>;
}

/// Spawns steps as child processes with inherited stdio
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Variables applied on top of the inherited environment
    env: ProcessEnvironment,

    /// Kill the child if it runs longer than this
    step_timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(env: ProcessEnvironment) -> Self {
        Self {
            env,
            step_timeout: None,
        }
    }

    pub fn with_timeout(mut self, step_timeout: Option<Duration>) -> Self {
        self.step_timeout = step_timeout;
        self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, step: &PipelineStep) -> Result<i32, RunError> {
        debug!("Spawning {}", step.command_line());

        let mut child = Command::new(&step.command)
            .args(&step.args)
            .envs(self.env.iter())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                command: step.command.clone(),
                source,
            })?;

        let status = match self.step_timeout {
            Some(limit) => match timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    warn!("Step {} exceeded {:?}, killing it", step.id, limit);
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill step {}: {}", step.id, e);
                    }
                    return Err(RunError::Timeout {
                        step: step.id.clone(),
                        limit,
                    });
                }
            },
            None => child.wait().await,
        }
        .map_err(|source| RunError::Wait {
            step: step.id.clone(),
            source,
        })?;

        // Terminated by a signal
        let code = status.code().unwrap_or(-1);
        debug!("Step {} exited with code {}", step.id, code);
        Ok(code)
    }
}
