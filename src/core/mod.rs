//! Core domain models
//!
//! This module defines the environment resolution step, the package layout,
//! the CMake invocation contract, and the pipelines built from them.

pub mod cmake;
pub mod config;
pub mod env;
pub mod pipeline;
pub mod state;
pub mod step;

pub use cmake::{BuildMode, CmakeInvocation, ConfigureOptions};
pub use config::{BuildLayout, RunConfig};
pub use env::{ConfigEntry, ConfigError, EnvResolver, ParsedEnvFile, ProcessEnvironment};
pub use pipeline::*;
pub use state::*;
pub use step::*;
