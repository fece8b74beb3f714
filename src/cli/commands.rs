//! Entry point logic for the two pipelines

use crate::cli::output::*;
use crate::cli::Cli;
use crate::core::{
    env::TOOLCHAIN_VAR, BuildLayout, CmakeInvocation, ConfigError, EnvResolver, Pipeline,
    ProcessEnvironment, RunConfig,
};
use crate::execution::{CommandRunner, ExecutionEngine, ExecutionEvent, ExitOutcome, ProcessRunner, RunError};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::error;

/// Which fixed pipeline an entry point runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    /// Configure, build and install
    Build,
    /// Build, install and run the test target
    Test,
}

impl PipelineKind {
    /// Resolve the environment this pipeline runs with
    ///
    /// Only the build pipeline reads `.env` and needs the toolchain file.
    pub fn resolve_environment(
        self,
        layout: &BuildLayout,
        ambient: ProcessEnvironment,
    ) -> Result<ProcessEnvironment, ConfigError> {
        match self {
            PipelineKind::Build => EnvResolver::new()
                .require(TOOLCHAIN_VAR)
                .resolve(&layout.env_file(), ambient),
            PipelineKind::Test => Ok(ambient),
        }
    }

    /// Build the step list, interpolating values from `env`
    pub fn pipeline(self, config: &RunConfig, env: &ProcessEnvironment) -> Result<Pipeline, ConfigError> {
        let cmake = CmakeInvocation::new(&config.cmake);
        match self {
            PipelineKind::Build => {
                let toolchain = env.get_non_empty(TOOLCHAIN_VAR).ok_or_else(|| {
                    ConfigError::MissingRequiredVariable {
                        name: TOOLCHAIN_VAR.to_string(),
                    }
                })?;
                Ok(Pipeline::build(&config.layout, &cmake, toolchain))
            }
            PipelineKind::Test => Ok(Pipeline::test(&config.layout, &cmake)),
        }
    }
}

/// A pipeline after execution together with its result
#[derive(Debug)]
pub struct RunReport {
    pub pipeline: Pipeline,
    pub result: Result<(), RunError>,
}

impl RunReport {
    pub fn outcome(&self) -> ExitOutcome {
        ExitOutcome::from(&self.result)
    }
}

/// Resolve the environment, build the pipeline and run it
///
/// `make_runner` receives the resolved environment and is only called when
/// resolution succeeds, so a configuration error never spawns anything.
pub async fn execute<R, F, H>(
    kind: PipelineKind,
    config: &RunConfig,
    ambient: ProcessEnvironment,
    make_runner: F,
    on_event: H,
) -> Result<RunReport, ConfigError>
where
    R: CommandRunner,
    F: FnOnce(ProcessEnvironment) -> R,
    H: Fn(ExecutionEvent) + Send + Sync + 'static,
{
    let env = kind.resolve_environment(&config.layout, ambient)?;
    let mut pipeline = kind.pipeline(config, &env)?;

    let mut engine = ExecutionEngine::new(make_runner(env));
    engine.add_event_handler(on_event);
    let result = engine.execute(&mut pipeline).await;

    Ok(RunReport { pipeline, result })
}

/// Run the pipeline for `kind` as configured by `cli`
///
/// Configuration and step failures are reported on the console and turned
/// into [`ExitOutcome::Failure`]; only unexpected environment problems (such
/// as an unreadable working directory) are returned as errors.
pub async fn run(kind: PipelineKind, cli: &Cli) -> Result<ExitOutcome> {
    run_with_ambient(kind, cli, ProcessEnvironment::from_ambient()).await
}

async fn run_with_ambient(kind: PipelineKind, cli: &Cli, ambient: ProcessEnvironment) -> Result<ExitOutcome> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let config = RunConfig::new(BuildLayout::new(root))
        .with_cmake(&cli.cmake)
        .with_step_timeout(cli.step_timeout.map(Duration::from_secs));

    if cli.dry_run {
        return dry_run(kind, &config, ambient, cli.json);
    }

    let step_timeout = config.step_timeout;
    let report = execute(
        kind,
        &config,
        ambient,
        |env| ProcessRunner::new(env).with_timeout(step_timeout),
        |event| println!("{}", format_execution_event(&event)),
    )
    .await;

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            println!("{} {}", CROSS, style(&e).red());
            return Ok(ExitOutcome::Failure);
        }
    };

    match &report.result {
        Ok(()) => println!(
            "\n{} {} completed {}",
            CHECK,
            style(&report.pipeline.name).bold(),
            style("successfully").green()
        ),
        Err(e) => println!(
            "\n{} {} {}: {}",
            CROSS,
            style(&report.pipeline.name).bold(),
            style("failed").red(),
            e
        ),
    }

    Ok(report.outcome())
}

/// Print the steps that would run
fn dry_run(kind: PipelineKind, config: &RunConfig, ambient: ProcessEnvironment, json: bool) -> Result<ExitOutcome> {
    let pipeline = match kind
        .resolve_environment(&config.layout, ambient)
        .and_then(|env| kind.pipeline(config, &env))
    {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("{}", e);
            println!("{} {}", CROSS, style(&e).red());
            return Ok(ExitOutcome::Failure);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&pipeline.steps)?);
    } else {
        println!("{} {} pipeline:", INFO, style(&pipeline.name).bold());
        println!("{}", format_plan(&pipeline));
    }
    Ok(ExitOutcome::Success)
}
