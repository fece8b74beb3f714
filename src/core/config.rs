//! Package layout and run settings

use crate::core::env::ENV_FILE_NAME;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory holding the CMake sources, relative to the package root
pub const CODE_DIR: &str = "code";

/// Directory CMake generates into, relative to the package root
pub const BUILD_DIR: &str = "cmake-build";

/// Filesystem layout of the package the pipelines operate on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildLayout {
    /// Package root; also where the JavaScript package is installed
    pub root: PathBuf,
}

impl BuildLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// CMake source directory
    pub fn code_dir(&self) -> PathBuf {
        self.root.join(CODE_DIR)
    }

    /// CMake build directory
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR)
    }

    /// Where installed JavaScript package artifacts go
    pub fn package_dir(&self) -> &Path {
        &self.root
    }

    /// Location of the optional `.env` file
    pub fn env_file(&self) -> PathBuf {
        self.root.join(ENV_FILE_NAME)
    }
}

/// Settings shared by both entry points
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub layout: BuildLayout,

    /// CMake executable name or path
    pub cmake: String,

    /// Optional per-step timeout
    pub step_timeout: Option<Duration>,
}

impl RunConfig {
    pub fn new(layout: BuildLayout) -> Self {
        Self {
            layout,
            cmake: "cmake".to_string(),
            step_timeout: None,
        }
    }

    pub fn with_cmake(mut self, cmake: impl Into<String>) -> Self {
        self.cmake = cmake.into();
        self
    }

    pub fn with_step_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.step_timeout = timeout;
        self
    }
}
