//! Step domain model

use serde::Serialize;
use std::fmt;

/// A single external command invocation in a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStep {
    /// Short stable step identifier (e.g. "configure")
    pub id: String,

    /// Executable name or path
    pub command: String,

    /// Arguments, already interpolated when the pipeline was built
    pub args: Vec<String>,
}

impl PipelineStep {
    /// Create a step
    pub fn new<I, S>(id: impl Into<String>, command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Render the command line for display, quoting arguments with spaces
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("\"{}\"", part)
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.command_line())
    }
}
