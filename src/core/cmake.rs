//! CMake invocation contract
//!
//! Turns the three CMake operations the pipelines need (configure, build,
//! install) into [`PipelineStep`]s.

use crate::core::step::PipelineStep;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Value passed as `CMAKE_BUILD_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildMode {
    Release,
    Debug,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Release => "Release",
            BuildMode::Debug => "Debug",
        }
    }
}

/// Arguments for `cmake -S ... -B ...`
#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub toolchain_file: String,
    pub build_mode: BuildMode,
    /// Extra `-D<key>=<value>` cache definitions, in order
    pub defines: Vec<(String, String)>,
}

impl ConfigureOptions {
    pub fn new(source_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>, toolchain_file: impl Into<String>) -> Self {
        Self {
            source_dir: source_dir.into(),
            build_dir: build_dir.into(),
            toolchain_file: toolchain_file.into(),
            build_mode: BuildMode::Release,
            defines: Vec::new(),
        }
    }

    pub fn with_build_mode(mut self, mode: BuildMode) -> Self {
        self.build_mode = mode;
        self
    }

    pub fn define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.push((key.into(), value.into()));
        self
    }
}

/// Builds CMake command steps
#[derive(Debug, Clone)]
pub struct CmakeInvocation {
    program: String,
}

impl CmakeInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    /// `cmake -S <src> -B <build> -DCMAKE_TOOLCHAIN_FILE=.. -DCMAKE_BUILD_TYPE=.. [-D..]`
    pub fn configure(&self, options: &ConfigureOptions) -> PipelineStep {
        let mut args = vec![
            "-S".to_string(),
            path_arg(&options.source_dir),
            "-B".to_string(),
            path_arg(&options.build_dir),
            format!("-DCMAKE_TOOLCHAIN_FILE={}", options.toolchain_file),
            format!("-DCMAKE_BUILD_TYPE={}", options.build_mode.as_str()),
        ];
        args.extend(options.defines.iter().map(|(k, v)| format!("-D{}={}", k, v)));

        PipelineStep::new("configure", &self.program, args)
    }

    /// `cmake --build <build> --target <target>`
    pub fn build(&self, build_dir: &Path, target: &str) -> PipelineStep {
        PipelineStep::new(
            format!("build {}", target),
            &self.program,
            ["--build".to_string(), path_arg(build_dir), "--target".to_string(), target.to_string()],
        )
    }

    /// `cmake --install <build>`
    pub fn install(&self, build_dir: &Path) -> PipelineStep {
        PipelineStep::new("install", &self.program, ["--install".to_string(), path_arg(build_dir)])
    }
}

impl Default for CmakeInvocation {
    fn default() -> Self {
        Self::new("cmake")
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
