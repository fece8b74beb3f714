//! `.env` file resolution
//!
//! Parses a simple line-oriented `key=value` file and merges it underneath
//! the ambient process environment. Variables already present in the
//! ambient environment always win over file values, so a shell export can
//! override a file default.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Variable naming the CMake toolchain file used by the build pipeline
pub const TOOLCHAIN_VAR: &str = "EMSCRIPTEN_CMAKE_TOOLCHAIN";

/// Default name of the configuration file in the package root
pub const ENV_FILE_NAME: &str = ".env";

// Unanchored on purpose: `A B=c` yields `B` = `c`, and anything after a
// second `=` in the value is dropped.
static ENTRY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*([^= \t]+)\s*=\s*([^= \t]+)").unwrap());

/// Errors produced while resolving the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} variable not defined. Either set it up in shell or put it in a .env file")]
    MissingRequiredVariable { name: String },

    #[error("{name} variable is defined but empty. Unset it in shell or give it a value")]
    EmptyRequiredVariable { name: String },
}

/// A single `key=value` setting read from the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

/// A line that was neither blank, a comment, nor a valid entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number in the file
    pub line_number: usize,
    /// The trimmed line text
    pub text: String,
}

/// Result of parsing `.env` content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEnvFile {
    /// Entries in file order (duplicates kept; the last one wins on merge)
    pub entries: Vec<ConfigEntry>,
    pub malformed: Vec<MalformedLine>,
}

/// Parse `.env` content into entries
///
/// Any line containing `#` is treated as a comment, even when the `#`
/// appears after a value. Malformed lines are logged and skipped.
pub fn parse_env_file(content: &str) -> ParsedEnvFile {
    let mut parsed = ParsedEnvFile::default();

    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    // `str::lines` splits on both `\n` and `\r\n`
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.contains('#') {
            continue;
        }

        match ENTRY_PATTERN.captures(line) {
            Some(caps) => parsed.entries.push(ConfigEntry {
                key: caps[1].to_string(),
                value: caps[2].to_string(),
            }),
            None => {
                warn!("Ignoring invalid line in {}: {}", ENV_FILE_NAME, line);
                parsed.malformed.push(MalformedLine {
                    line_number: index + 1,
                    text: line.to_string(),
                });
            }
        }
    }

    parsed
}

/// Explicit process environment threaded through resolution and execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessEnvironment {
    vars: BTreeMap<String, String>,
}

impl ProcessEnvironment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_ambient() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Get a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Get a variable, treating an empty value as unset
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Merge file entries without overriding variables that are already set
    ///
    /// Among entries for the same key, the last one in file order is used.
    /// Returns the keys that were actually added.
    pub fn merge_defaults(&mut self, entries: &[ConfigEntry]) -> Vec<String> {
        let mut from_file: BTreeMap<&str, &str> = BTreeMap::new();
        for entry in entries {
            from_file.insert(&entry.key, &entry.value);
        }

        let mut added = Vec::new();
        for (key, value) in from_file {
            if self.vars.contains_key(key) {
                debug!("Keeping ambient value for {}", key);
                continue;
            }
            self.vars.insert(key.to_string(), value.to_string());
            added.push(key.to_string());
        }
        added
    }

    /// Iterate over all variables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProcessEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Resolves the `.env` file on top of an ambient environment
#[derive(Debug, Clone)]
pub struct EnvResolver {
    /// Variables that must be set after the merge
    required: Vec<String>,
}

impl EnvResolver {
    /// Resolver that requires no variables
    pub fn new() -> Self {
        Self { required: Vec::new() }
    }

    /// Require a variable to be present and non-empty after the merge
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Load `config_path` (if readable) and merge it under `ambient`
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingRequiredVariable`] or
    /// [`ConfigError::EmptyRequiredVariable`] for the first required
    /// variable that is unset or empty after the merge. A missing or
    /// unreadable file is not an error.
    pub fn resolve(
        &self,
        config_path: &Path,
        mut ambient: ProcessEnvironment,
    ) -> Result<ProcessEnvironment, ConfigError> {
        match std::fs::read_to_string(config_path) {
            Ok(content) => {
                let parsed = parse_env_file(&content);
                let added = ambient.merge_defaults(&parsed.entries);
                debug!(
                    "Loaded {} entries from {} ({} applied)",
                    parsed.entries.len(),
                    config_path.display(),
                    added.len()
                );
            }
            Err(e) => {
                debug!("Skipping {}: {}", config_path.display(), e);
            }
        }

        self.check(&ambient)?;
        Ok(ambient)
    }

    /// Verify every required variable is present
    pub fn check(&self, env: &ProcessEnvironment) -> Result<(), ConfigError> {
        for name in &self.required {
            match env.get(name) {
                None => return Err(ConfigError::MissingRequiredVariable { name: name.clone() }),
                Some("") => return Err(ConfigError::EmptyRequiredVariable { name: name.clone() }),
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl Default for EnvResolver {
    fn default() -> Self {
        Self::new()
    }
}
