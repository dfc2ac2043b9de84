//! CLI front door.
//!
//! Helpers behind the `archgraph` subcommands:
//! - `analyze`: model summary and warnings
//! - `model`: the full structural model
//! - `graph`: one derived graph
//!
//! Each helper loads the config for the root, applies command-line
//! overrides on top of it and runs the Python pipeline. The caller
//! (`main.rs`) renders the returned response as JSON.
//!
//! All functions return `Result<T, ArchError>` so errors carry stable exit
//! codes.

use std::path::{Path, PathBuf};

use clap::Args;

use archgraph_core::cancel::CancellationToken;
use archgraph_core::error::ArchError;
use archgraph_core::graph::{GraphKind, GraphOptions};
use archgraph_core::output::{AnalyzeResponse, GraphResponse};
use archgraph_core::pipeline::{analyze, Analysis};
use archgraph_python::PythonAdapter;

use crate::config::ArchgraphConfig;

/// Where to analyze and how to find settings.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub root: PathBuf,
    /// Explicit config file; `archgraph.json` under the root otherwise.
    pub config: Option<PathBuf>,
    /// Exclude globs from `-e`, appended to the config file's.
    pub exclude: Vec<String>,
}

impl AnalysisRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AnalysisRequest {
            root: root.into(),
            ..Default::default()
        }
    }

    fn root_display(&self) -> String {
        self.root.display().to_string()
    }
}

/// Graph option flags. A flag that is present wins over the config file.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphFlags {
    /// Keep `_private` classes, functions and members.
    #[arg(long)]
    pub include_private: bool,
    /// Do not list methods.
    #[arg(long)]
    pub no_methods: bool,
    /// Do not list attributes.
    #[arg(long)]
    pub no_attributes: bool,
    /// Maximum depth from the graph's roots.
    #[arg(long, allow_negative_numbers = true)]
    pub max_depth: Option<i64>,
    /// Show external bases and packages as placeholder nodes.
    #[arg(long)]
    pub include_external: bool,
    /// Collapse modules into their package (dependency graph).
    #[arg(long)]
    pub group_by_package: bool,
    /// Restrict the call graph to one module and its neighbors.
    #[arg(long)]
    pub focus_module: Option<String>,
    /// Keep packages with no modules (package tree).
    #[arg(long)]
    pub show_empty: bool,
    /// Show classes and functions as leaves (package tree).
    #[arg(long)]
    pub include_members: bool,
}

impl GraphFlags {
    /// Overlay these flags on `base`.
    pub fn apply(&self, base: GraphOptions) -> GraphOptions {
        let mut options = base;
        if self.include_private {
            options.include_private = true;
        }
        if self.no_methods {
            options.include_methods = false;
        }
        if self.no_attributes {
            options.include_attributes = false;
        }
        if self.max_depth.is_some() {
            options.max_depth = self.max_depth;
        }
        if self.include_external {
            options.include_external = true;
        }
        if self.group_by_package {
            options.group_by_package = true;
        }
        if self.focus_module.is_some() {
            options.focus_module = self.focus_module.clone();
        }
        if self.show_empty {
            options.show_empty = true;
        }
        if self.include_members {
            options.include_members = true;
        }
        options
    }
}

/// Load settings for the request and run the Python pipeline.
pub fn run_analysis(
    request: &AnalysisRequest,
    cancel: &CancellationToken,
) -> Result<Analysis, ArchError> {
    let config = ArchgraphConfig::load(&request.root, request.config.as_deref())?;
    let analysis_config = config.analysis_config(&request.exclude);
    Ok(analyze(&request.root, &PythonAdapter, &analysis_config, cancel)?)
}

/// `archgraph analyze`.
pub fn run_analyze(
    request: &AnalysisRequest,
    cancel: &CancellationToken,
) -> Result<AnalyzeResponse, ArchError> {
    let analysis = run_analysis(request, cancel)?;
    Ok(AnalyzeResponse::new(
        request.root_display(),
        analysis.files_scanned,
        analysis.model.summary(),
        analysis.warnings,
    ))
}

/// `archgraph graph`.
///
/// Options are validated before any file is read.
pub fn run_graph(
    request: &AnalysisRequest,
    kind: GraphKind,
    flags: &GraphFlags,
    cancel: &CancellationToken,
) -> Result<GraphResponse, ArchError> {
    let config = ArchgraphConfig::load(&request.root, request.config.as_deref())?;
    let options = flags.apply(config.graph.clone());
    options.validate()?;

    let analysis_config = config.analysis_config(&request.exclude);
    let analysis = analyze(&request.root, &PythonAdapter, &analysis_config, cancel)?;
    let graph = kind.build(&analysis.model, &options)?;
    Ok(GraphResponse::new(
        request.root_display(),
        options,
        graph,
        analysis.warnings,
    ))
}

/// Check that `root` names something before doing any work.
pub fn require_root(root: &Path) -> Result<(), ArchError> {
    if root.as_os_str().is_empty() {
        return Err(ArchError::invalid_args("root path must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod flags {
        use super::*;

        #[test]
        fn absent_flags_keep_base() {
            let base = GraphOptions::default()
                .with_private(true)
                .with_max_depth(Some(3));
            assert_eq!(GraphFlags::default().apply(base.clone()), base);
        }

        #[test]
        fn present_flags_win() {
            let base = GraphOptions::default().with_max_depth(Some(3));
            let flags = GraphFlags {
                no_methods: true,
                max_depth: Some(1),
                focus_module: Some("pkg.mod".to_string()),
                ..Default::default()
            };
            let options = flags.apply(base);
            assert!(!options.include_methods);
            assert!(options.include_attributes);
            assert_eq!(options.max_depth, Some(1));
            assert_eq!(options.focus_module.as_deref(), Some("pkg.mod"));
        }
    }

    #[test]
    fn empty_root_is_invalid() {
        let err = require_root(Path::new("")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
