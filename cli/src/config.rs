//! Configuration for the `argflat` binary.
//!
//! Loaded from an optional YAML file passed with `--config`. Every section
//! is optional; missing keys fall back to their defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! flatten:
//!   collision: first_wins
//!   prompt_required: true
//!   document_leaves: true
//! format: table
//! ```

use std::io::BufReader;
use std::path::Path;

use argflat_core::FlattenOptions;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Top-level binary configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Options handed to the flattener for every command.
    pub flatten: FlattenOptions,
    /// Default output format for `inspect`.
    pub format: OutputFormat,
}

impl CliConfig {
    /// Loads configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|err| format!("Failed to read config '{}': {err}", path.display()))?;
        serde_yaml::from_reader(BufReader::new(file))
            .map_err(|err| format!("Invalid config '{}': {err}", path.display()))
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
