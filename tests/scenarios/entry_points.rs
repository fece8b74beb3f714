//! Test: Entry Points - environment resolution feeding the fixed pipelines

use crate::helpers::*;
use spreader_tasks::cli::{execute, PipelineKind};
use spreader_tasks::core::{env::TOOLCHAIN_VAR, BuildLayout, ConfigError, ProcessEnvironment, RunConfig};
use spreader_tasks::execution::ExitOutcome;
use std::path::Path;

fn config_in(root: &Path) -> RunConfig {
    RunConfig::new(BuildLayout::new(root))
}

#[tokio::test]
async fn test_missing_toolchain_spawns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let spy = SpyRunner::succeeding();

    let runner = spy.clone();
    let result = execute(
        PipelineKind::Build,
        &config_in(dir.path()),
        ProcessEnvironment::new(),
        move |_| runner,
        |_| {},
    )
    .await;

    match result {
        Err(ConfigError::MissingRequiredVariable { name }) => assert_eq!(name, TOOLCHAIN_VAR),
        other => panic!("expected MissingRequiredVariable, got {:?}", other),
    }
    assert!(spy.invocations().is_empty());
}

#[tokio::test]
async fn test_build_uses_toolchain_from_env_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        format!("# toolchain\n{}=/emsdk/Emscripten.cmake\n", TOOLCHAIN_VAR),
    )
    .unwrap();
    let spy = SpyRunner::succeeding();

    let runner = spy.clone();
    let report = execute(
        PipelineKind::Build,
        &config_in(dir.path()),
        ProcessEnvironment::new(),
        move |env| {
            assert_eq!(env.get(TOOLCHAIN_VAR), Some("/emsdk/Emscripten.cmake"));
            runner
        },
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.outcome(), ExitOutcome::Success);
    let invocations = spy.invocations();
    assert_eq!(invocations.len(), 3);
    assert!(invocations[0]
        .args
        .contains(&"-DCMAKE_TOOLCHAIN_FILE=/emsdk/Emscripten.cmake".to_string()));
    assert_eq!(invocations[1].args[2..], ["--target".to_string(), "spreader.js".to_string()]);
    assert_eq!(invocations[2].args[0], "--install");
}

#[tokio::test]
async fn test_shell_toolchain_overrides_env_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), format!("{}=/from/file.cmake\n", TOOLCHAIN_VAR)).unwrap();
    let ambient: ProcessEnvironment = [(TOOLCHAIN_VAR, "/from/shell.cmake")].into_iter().collect();
    let spy = SpyRunner::succeeding();

    let runner = spy.clone();
    execute(PipelineKind::Build, &config_in(dir.path()), ambient, move |_| runner, |_| {})
        .await
        .unwrap();

    assert!(spy.invocations()[0]
        .args
        .contains(&"-DCMAKE_TOOLCHAIN_FILE=/from/shell.cmake".to_string()));
}

#[tokio::test]
async fn test_test_pipeline_halts_when_install_fails() {
    let dir = tempfile::tempdir().unwrap();
    let spy = SpyRunner::new(vec![Scripted::Exit(0), Scripted::Exit(1)]);

    let runner = spy.clone();
    let report = execute(
        PipelineKind::Test,
        &config_in(dir.path()),
        ProcessEnvironment::new(),
        move |_| runner,
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.outcome(), ExitOutcome::Failure);
    assert_eq!(spy.invoked_ids(), vec!["build spreader.js", "install"]);
    assert_step_skipped(&report.pipeline, "build run-spreader.js-test");
}
