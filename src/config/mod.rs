//! Evaluation options for pathquill.
//!
//! This module provides the option set every query is evaluated with, with
//! sensible defaults and support for serialization/deserialization via serde.
//! Options can be loaded from TOML files.
//!
//! # Example
//!
//! ```
//! use pathquill::config::{Options, ResultShape};
//!
//! // Use default options
//! let options = Options::default();
//! assert_eq!(options.result, ResultShape::Values);
//! assert!(options.memoize);
//!
//! // Ask for paths instead of values
//! let paths = Options {
//!     result: ResultShape::Paths,
//!     ..Options::default()
//! };
//! assert!(paths.result.includes_paths());
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What a query hands back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultShape {
    /// Matched values only
    #[default]
    Values,
    /// Normalized paths of the matches only
    Paths,
    /// Path and value pairs
    Both,
}

impl ResultShape {
    pub fn includes_values(self) -> bool {
        matches!(self, ResultShape::Values | ResultShape::Both)
    }

    pub fn includes_paths(self) -> bool {
        matches!(self, ResultShape::Paths | ResultShape::Both)
    }
}

/// Options for a single query evaluation.
///
/// # Fields
///
/// * `result` - Shape of the query output: "values", "paths" or "both" (default: "values")
/// * `memoize` - Evaluate each root-anchored sub-path at most once per query (default: true)
/// * `max_depth` - Deepest level recursive descent will visit (default: 1024)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Shape of the query output
    #[serde(default)]
    pub result: ResultShape,

    /// Memoize root-anchored sub-evaluations
    #[serde(default = "default_memoize")]
    pub memoize: bool,

    /// Depth limit for recursive descent
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Returns the default for memoization.
fn default_memoize() -> bool {
    true
}

/// Returns the default recursive descent depth limit.
fn default_max_depth() -> usize {
    1024
}

impl Default for Options {
    fn default() -> Self {
        Self {
            result: ResultShape::default(),
            memoize: default_memoize(),
            max_depth: default_max_depth(),
        }
    }
}

impl Options {
    /// Returns the path to the options file.
    ///
    /// Uses `~/.config/pathquill/options.toml` on all platforms.
    pub fn config_path() -> Option<std::path::PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("pathquill");
            path.push("options.toml");
            path
        })
    }

    /// Loads options from the default options file.
    ///
    /// Returns the default options if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|err| {
                log::warn!("Ignoring options file {}: {:#}", path.display(), err);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Loads options from a TOML file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    /// Parses options from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("Failed to parse options")
    }

    /// Saves options to a TOML file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }
}
