//! Pipeline domain model

use crate::core::{
    cmake::{CmakeInvocation, ConfigureOptions},
    config::BuildLayout,
    state::{ExecutionStatus, PipelineState, StepState},
    step::PipelineStep,
};
use serde::Serialize;

/// CMake target producing the JavaScript package
pub const PACKAGE_TARGET: &str = "spreader.js";

/// CMake target that runs the JavaScript test suite
pub const TEST_TARGET: &str = "run-spreader.js-test";

/// Cache variable telling CMake where to install the package
pub const PACKAGE_DIR_DEFINE: &str = "SPR_JAVASCRIPT_PACKAGE_DIR";

/// An ordered sequence of steps plus their runtime state
#[derive(Debug, Clone, Serialize)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Steps in execution order
    pub steps: Vec<PipelineStep>,

    /// Per-step state, parallel to `steps`
    step_states: Vec<StepState>,

    /// Execution state
    pub state: PipelineState,
}

impl Pipeline {
    /// Create a pipeline from an ordered list of steps
    pub fn new(name: impl Into<String>, steps: Vec<PipelineStep>) -> Self {
        let step_states = vec![StepState::Pending; steps.len()];
        Self {
            name: name.into(),
            steps,
            step_states,
            state: PipelineState::new(),
        }
    }

    /// Configure, build and install the package
    pub fn build(layout: &BuildLayout, cmake: &CmakeInvocation, toolchain_file: &str) -> Self {
        let build_dir = layout.build_dir();
        let configure = ConfigureOptions::new(layout.code_dir(), &build_dir, toolchain_file)
            .define(PACKAGE_DIR_DEFINE, layout.package_dir().to_string_lossy());

        Self::new(
            "build",
            vec![
                cmake.configure(&configure),
                cmake.build(&build_dir, PACKAGE_TARGET),
                cmake.install(&build_dir),
            ],
        )
    }

    /// Rebuild, install and run the test target in an already configured tree
    pub fn test(layout: &BuildLayout, cmake: &CmakeInvocation) -> Self {
        let build_dir = layout.build_dir();
        Self::new(
            "test",
            vec![
                cmake.build(&build_dir, PACKAGE_TARGET),
                cmake.install(&build_dir),
                cmake.build(&build_dir, TEST_TARGET),
            ],
        )
    }

    /// Get the state of a step by ID
    pub fn step_state(&self, id: &str) -> Option<&StepState> {
        self.steps
            .iter()
            .position(|s| s.id == id)
            .map(|i| &self.step_states[i])
    }

    /// Get the state of the step at `index`
    pub fn state_at(&self, index: usize) -> Option<&StepState> {
        self.step_states.get(index)
    }

    pub(crate) fn state_at_mut(&mut self, index: usize) -> Option<&mut StepState> {
        self.step_states.get_mut(index)
    }

    /// Steps paired with their current state
    pub fn iter_with_state(&self) -> impl Iterator<Item = (&PipelineStep, &StepState)> {
        self.steps.iter().zip(self.step_states.iter())
    }

    /// Check if every step has reached a terminal state
    pub fn is_complete(&self) -> bool {
        self.step_states.iter().all(StepState::is_terminal)
    }

    /// Check if pipeline has failed
    pub fn has_failed(&self) -> bool {
        self.state.status == ExecutionStatus::Failed
    }

    /// Recount completed and failed steps
    pub(crate) fn update_counts(&mut self) {
        self.state.completed_steps = self
            .step_states
            .iter()
            .filter(|s| matches!(s, StepState::Completed { .. }))
            .count();
        self.state.failed_steps = self
            .step_states
            .iter()
            .filter(|s| matches!(s, StepState::Failed { .. }))
            .count();
    }
}
