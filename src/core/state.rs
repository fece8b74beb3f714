//! Execution state models

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Overall pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionStatus {
    /// Pipeline has not started
    Pending,
    /// Pipeline is currently running
    Running,
    /// Every step exited successfully
    Completed,
    /// A step failed and the pipeline halted
    Failed,
}

/// State of a single step
#[derive(Debug, Clone, Serialize)]
pub enum StepState {
    /// Step has not run yet
    Pending,
    /// Step is currently running
    Running {
        started_at: DateTime<Utc>,
    },
    /// Step exited with status zero
    Completed {
        exit_code: i32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    /// Step could not be started, exited non-zero, or timed out
    Failed {
        error: String,
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
    },
    /// Step never ran because an earlier step failed
    Skipped {
        reason: String,
    },
}

impl StepState {
    /// Check if step is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepState::Completed { .. } | StepState::Failed { .. } | StepState::Skipped { .. }
        )
    }

    fn started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            StepState::Running { started_at }
            | StepState::Completed { started_at, .. }
            | StepState::Failed { started_at, .. } => Some(*started_at),
            _ => None,
        }
    }

    /// Transition a running step to completed
    pub fn complete(&mut self, exit_code: i32) {
        let now = Utc::now();
        *self = StepState::Completed {
            exit_code,
            started_at: self.started_at().unwrap_or(now),
            completed_at: now,
        };
    }

    /// Transition a running step to failed
    pub fn fail(&mut self, error: String) {
        let now = Utc::now();
        *self = StepState::Failed {
            error,
            started_at: self.started_at().unwrap_or(now),
            failed_at: now,
        };
    }
}

/// Overall pipeline state
#[derive(Debug, Clone, Serialize)]
pub struct PipelineState {
    /// Unique execution ID
    pub execution_id: Uuid,

    /// Current execution status
    pub status: ExecutionStatus,

    /// When execution started
    pub started_at: Option<DateTime<Utc>>,

    /// When execution completed/failed
    pub completed_at: Option<DateTime<Utc>>,

    /// Total number of steps
    pub total_steps: usize,

    /// Number of completed steps
    pub completed_steps: usize,

    /// Number of failed steps
    pub failed_steps: usize,
}

impl PipelineState {
    /// Create a new pipeline state
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            total_steps: 0,
            completed_steps: 0,
            failed_steps: 0,
        }
    }

    /// Mark pipeline as started
    pub fn start(&mut self, total_steps: usize) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
        self.total_steps = total_steps;
    }

    /// Mark pipeline as completed
    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark pipeline as failed
    pub fn fail(&mut self) {
        self.status = ExecutionStatus::Failed;
        self.completed_at = Some(Utc::now());
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}
