//! Config file loading.
//!
//! An optional `archgraph.json` at the analyzed root (or a file named with
//! `--config`) supplies defaults for excludes, walker switches and the graph
//! option bag. Command-line flags override it field by field.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use archgraph_core::error::ArchError;
use archgraph_core::graph::GraphOptions;
use archgraph_core::pipeline::AnalysisConfig;

/// File name looked up at the analyzed root.
pub const CONFIG_FILE_NAME: &str = "archgraph.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl From<ConfigError> for ArchError {
    fn from(err: ConfigError) -> Self {
        ArchError::config(err.to_string())
    }
}

/// Settings read from a config file. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchgraphConfig {
    /// Extra exclude globs, on top of the built-in ones.
    pub exclude: Vec<String>,
    pub use_default_excludes: bool,
    pub follow_symlinks: bool,
    pub graph: GraphOptions,
}

impl Default for ArchgraphConfig {
    fn default() -> Self {
        ArchgraphConfig {
            exclude: Vec::new(),
            use_default_excludes: true,
            follow_symlinks: true,
            graph: GraphOptions::default(),
        }
    }
}

impl ArchgraphConfig {
    /// Parse config text. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the config for `root`.
    ///
    /// An explicit path must exist. Otherwise `archgraph.json` under the root
    /// is used when present, and built-in defaults when not.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = root.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    tracing::debug!(root = %root.display(), "no config file, using defaults");
                    return Ok(ArchgraphConfig::default());
                }
                candidate
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::parse(&text, &path)
    }

    /// Walker and pipeline settings, with `extra_excludes` appended.
    pub fn analysis_config(&self, extra_excludes: &[String]) -> AnalysisConfig {
        let mut exclude_patterns = self.exclude.clone();
        exclude_patterns.extend(extra_excludes.iter().cloned());
        AnalysisConfig {
            exclude_patterns,
            use_default_excludes: self.use_default_excludes,
            follow_symlinks: self.follow_symlinks,
        }
    }
}
