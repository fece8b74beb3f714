//! Test: Failure Handling - the pipeline halts at the first failing step

use crate::helpers::*;
use spreader_tasks::core::ExecutionStatus;
use spreader_tasks::execution::{ExecutionEngine, ExecutionEvent, ExitOutcome, RunError};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_non_zero_exit_stops_pipeline() {
    let mut pipeline = pipeline_of(&["one", "two", "three"]);
    let spy = SpyRunner::new(vec![Scripted::Exit(0), Scripted::Exit(2)]);

    let result = run_with_spy(&mut pipeline, &spy).await;

    match &result {
        Err(RunError::StepFailed { step, code }) => {
            assert_eq!(step, "two");
            assert_eq!(*code, 2);
        }
        other => panic!("expected StepFailed, got {:?}", other),
    }
    assert_eq!(ExitOutcome::from(&result).code(), 1);

    // Step three must never be invoked
    assert_eq!(spy.invoked_ids(), vec!["one", "two"]);
    assert_step_completed(&pipeline, "one");
    assert_step_failed(&pipeline, "two", "exited with code 2");
    assert_step_skipped(&pipeline, "three");
    assert_eq!(pipeline.state.status, ExecutionStatus::Failed);
    assert_eq!(pipeline.state.failed_steps, 1);
}

#[tokio::test]
async fn test_spawn_failure_stops_pipeline() {
    let mut pipeline = pipeline_of(&["one", "two"]);
    let spy = SpyRunner::new(vec![Scripted::SpawnError]);

    let result = run_with_spy(&mut pipeline, &spy).await;

    let err = result.unwrap_err();
    assert!(matches!(err, RunError::Spawn { .. }));
    assert!(err.to_string().contains("No such file or directory"));
    assert_eq!(spy.invoked_ids(), vec!["one"]);
    assert_step_failed(&pipeline, "one", "failed to start tool");
    assert_step_skipped(&pipeline, "two");
}

#[tokio::test]
async fn test_signal_exit_code_is_failure() {
    let mut pipeline = pipeline_of(&["killed"]);
    let spy = SpyRunner::new(vec![Scripted::Exit(-1)]);

    let result = run_with_spy(&mut pipeline, &spy).await;
    assert!(matches!(result, Err(RunError::StepFailed { code: -1, .. })));
}

#[tokio::test]
async fn test_failure_events() {
    let mut pipeline = pipeline_of(&["a", "b", "c"]);
    let spy = SpyRunner::new(vec![Scripted::Exit(1)]);
    let events = Arc::new(Mutex::new(Vec::new()));

    let mut engine = ExecutionEngine::new(spy);
    let sink = events.clone();
    engine.add_event_handler(move |event| sink.lock().unwrap().push(event));
    engine.execute(&mut pipeline).await.unwrap_err();

    let events = events.lock().unwrap();
    assert!(matches!(events.first(), Some(ExecutionEvent::PipelineStarted { total_steps: 3, .. })));
    assert!(matches!(&events[2], ExecutionEvent::StepFailed { step_id, .. } if step_id == "a"));
    let skipped: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ExecutionEvent::StepSkipped { step_id } => Some(step_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec!["b", "c"]);
    assert!(matches!(
        events.last(),
        Some(ExecutionEvent::PipelineCompleted {
            status: ExecutionStatus::Failed,
            ..
        })
    ));
}
