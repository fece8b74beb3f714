//! Main execution engine - runs a pipeline's steps in order

use crate::{
    core::{ExecutionStatus, Pipeline, StepState},
    execution::{CommandRunner, RunError},
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        execution_id: Uuid,
        pipeline_name: String,
        total_steps: usize,
    },
    StepStarted {
        step_id: String,
        index: usize,
        command_line: String,
    },
    StepCompleted {
        step_id: String,
        exit_code: i32,
    },
    StepFailed {
        step_id: String,
        error: String,
    },
    StepSkipped {
        step_id: String,
    },
    PipelineCompleted {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Process exit status of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failure,
}

impl ExitOutcome {
    /// Failures are always normalized to 1
    pub fn code(self) -> i32 {
        match self {
            ExitOutcome::Success => 0,
            ExitOutcome::Failure => 1,
        }
    }
}

impl<T, E> From<&Result<T, E>> for ExitOutcome {
    fn from(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            ExitOutcome::Success
        } else {
            ExitOutcome::Failure
        }
    }
}

/// Sequential pipeline execution engine
pub struct ExecutionEngine<R> {
    runner: R,
    event_handlers: Vec<EventHandler>,
}

impl<R: CommandRunner> ExecutionEngine<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Get the underlying runner
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Execute the pipeline, one step at a time
    ///
    /// Stops at the first step that fails to start, times out, or exits
    /// non-zero; every later step is marked skipped and never run.
    pub async fn execute(&self, pipeline: &mut Pipeline) -> Result<(), RunError> {
        let execution_id = pipeline.state.execution_id;
        let total_steps = pipeline.steps.len();

        info!("Starting pipeline execution: {} ({})", pipeline.name, execution_id);
        self.emit_event(ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name: pipeline.name.clone(),
            total_steps,
        });

        pipeline.state.start(total_steps);

        for index in 0..total_steps {
            let step = pipeline.steps[index].clone();

            if let Some(state) = pipeline.state_at_mut(index) {
                *state = StepState::Running {
                    started_at: chrono::Utc::now(),
                };
            }
            self.emit_event(ExecutionEvent::StepStarted {
                step_id: step.id.clone(),
                index,
                command_line: step.command_line(),
            });

            let result = match self.runner.run(&step).await {
                Ok(0) => Ok(0),
                Ok(code) => Err(RunError::StepFailed {
                    step: step.id.clone(),
                    code,
                }),
                Err(e) => Err(e),
            };

            match result {
                Ok(exit_code) => {
                    info!("Step {} completed", step.id);
                    if let Some(state) = pipeline.state_at_mut(index) {
                        state.complete(exit_code);
                    }
                    self.emit_event(ExecutionEvent::StepCompleted {
                        step_id: step.id.clone(),
                        exit_code,
                    });
                }
                Err(err) => {
                    error!("Step {} failed: {}", step.id, err);
                    if let Some(state) = pipeline.state_at_mut(index) {
                        state.fail(err.to_string());
                    }
                    self.emit_event(ExecutionEvent::StepFailed {
                        step_id: step.id.clone(),
                        error: err.to_string(),
                    });

                    self.skip_remaining(pipeline, index + 1);
                    self.finish(pipeline, ExecutionStatus::Failed);
                    return Err(err);
                }
            }

            pipeline.update_counts();
        }

        self.finish(pipeline, ExecutionStatus::Completed);
        Ok(())
    }

    fn skip_remaining(&self, pipeline: &mut Pipeline, from: usize) {
        for index in from..pipeline.steps.len() {
            let step_id = pipeline.steps[index].id.clone();
            if let Some(state) = pipeline.state_at_mut(index) {
                *state = StepState::Skipped {
                    reason: "an earlier step failed".to_string(),
                };
            }
            self.emit_event(ExecutionEvent::StepSkipped { step_id });
        }
    }

    fn finish(&self, pipeline: &mut Pipeline, status: ExecutionStatus) {
        pipeline.update_counts();
        match status {
            ExecutionStatus::Completed => pipeline.state.complete(),
            _ => pipeline.state.fail(),
        }

        info!("Pipeline execution finished: {} - {:?}", pipeline.name, status);
        self.emit_event(ExecutionEvent::PipelineCompleted {
            execution_id: pipeline.state.execution_id,
            status,
        });
    }
}
