//! Analysis pipeline: walk, extract, aggregate, resolve.
//!
//! Extraction runs on the rayon pool, one task per file. Results are sorted
//! by `(module name, path)` before they reach the [`ModelBuilder`], so the
//! model never depends on which worker finished first.

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapter::{ExtractFailure, LanguageAdapter};
use crate::cancel::{Cancellable, CancellationToken};
use crate::facts::{content_hash, ModelBuilder, ModuleFacts, StructuralModel};
use crate::warning::{AnalysisWarning, WarningKind};
use crate::workspace::{self, ModuleIdentity, WalkConfig, WalkError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("analysis cancelled")]
    Cancelled,

    /// The language adapter could not work at all.
    #[error("{message}")]
    Adapter { message: String },
}

/// Walker settings for one run. The file extension comes from the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub exclude_patterns: Vec<String>,
    pub use_default_excludes: bool,
    pub follow_symlinks: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            exclude_patterns: Vec::new(),
            use_default_excludes: true,
            follow_symlinks: true,
        }
    }
}

impl AnalysisConfig {
    fn walk_config(&self, extension: &str) -> WalkConfig {
        WalkConfig::for_extension(extension)
            .with_excludes(self.exclude_patterns.iter().cloned())
            .with_default_excludes(self.use_default_excludes)
            .with_follow_symlinks(self.follow_symlinks)
    }
}

/// The result of a successful run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub model: StructuralModel,
    /// Walker, extraction and aggregation warnings, in that order.
    pub warnings: Vec<AnalysisWarning>,
    /// Number of candidate files the walker produced.
    pub files_scanned: usize,
}

enum Extracted {
    Facts(Box<ModuleFacts>),
    Skipped(AnalysisWarning),
}

struct Outcome {
    module: String,
    path: String,
    extracted: Extracted,
}

/// Analyze the source tree under `root`.
///
/// Fails only if the root cannot be walked, an exclude pattern is malformed,
/// the adapter is unusable, or `cancel` fires. Bad files become warnings.
pub fn analyze<A: LanguageAdapter>(
    root: &Path,
    adapter: &A,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> Result<Analysis, AnalysisError> {
    let walk_config = config.walk_config(adapter.extension());
    let walked = workspace::walk(root, &walk_config, |rel| adapter.module_identity(rel))?;
    let files_scanned = walked.files.len();

    let outcomes = {
        let _span = tracing::debug_span!("extract", language = adapter.language()).entered();
        walked
            .files
            .par_iter()
            .map(|file| {
                if cancel.is_cancelled() {
                    return Err(AnalysisError::Cancelled);
                }
                let identity = ModuleIdentity {
                    name: file.module_name.clone(),
                    is_package: file.is_package,
                };
                let extracted = match read_source(&file.path, &file.relative_path) {
                    Ok(text) => extract_one(adapter, &identity, &file.relative_path, &text)?,
                    Err(warning) => Extracted::Skipped(warning),
                };
                Ok(Outcome {
                    module: identity.name,
                    path: file.relative_path.clone(),
                    extracted,
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    if cancel.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }
    Ok(assemble(outcomes, walked.warnings, files_scanned))
}

/// Analyze in-memory `(relative path, text)` pairs.
///
/// Paths the adapter cannot name as modules are ignored, exactly as the
/// walker would skip them.
pub fn analyze_sources<A: LanguageAdapter>(
    adapter: &A,
    sources: &[(String, String)],
) -> Result<Analysis, AnalysisError> {
    let mut outcomes = Vec::new();
    for (path, text) in sources {
        let Some(identity) = adapter.module_identity(path) else {
            tracing::debug!(path = %path, "no module name for source, skipped");
            continue;
        };
        let extracted = extract_one(adapter, &identity, path, text)?;
        outcomes.push(Outcome {
            module: identity.name,
            path: path.clone(),
            extracted,
        });
    }
    let files_scanned = outcomes.len();
    Ok(assemble(outcomes, Vec::new(), files_scanned))
}

fn read_source(path: &Path, relative_path: &str) -> Result<String, AnalysisWarning> {
    let bytes = fs::read(path).map_err(|e| {
        let warning = AnalysisWarning::new(WarningKind::ReadFailure, e.to_string())
            .with_path(relative_path);
        warning.log();
        warning
    })?;
    String::from_utf8(bytes).map_err(|_| {
        let warning = AnalysisWarning::new(WarningKind::ReadFailure, "file is not valid UTF-8")
            .with_path(relative_path);
        warning.log();
        warning
    })
}

fn extract_one<A: LanguageAdapter>(
    adapter: &A,
    identity: &ModuleIdentity,
    relative_path: &str,
    text: &str,
) -> Result<Extracted, AnalysisError> {
    match adapter.extract(identity, relative_path, text) {
        Ok(mut facts) => {
            facts.module.content_hash = content_hash(text);
            tracing::debug!(
                module = %identity.name,
                classes = facts.classes.len(),
                functions = facts.functions.len(),
                "extracted"
            );
            Ok(Extracted::Facts(Box::new(facts)))
        }
        Err(err) if err.is_fatal() => Err(AnalysisError::Adapter {
            message: err.to_string(),
        }),
        Err(err) => {
            let mut warning = AnalysisWarning::new(WarningKind::ParseFailure, err.to_string())
                .with_path(relative_path)
                .with_module(identity.name.clone());
            if let Some(line) = err.line() {
                warning = warning.with_line(line);
            }
            warning.log();
            Ok(Extracted::Skipped(warning))
        }
    }
}

fn assemble(
    mut outcomes: Vec<Outcome>,
    mut warnings: Vec<AnalysisWarning>,
    files_scanned: usize,
) -> Analysis {
    outcomes.sort_by(|a, b| (&a.module, &a.path).cmp(&(&b.module, &b.path)));

    let mut builder = ModelBuilder::new();
    for outcome in outcomes {
        match outcome.extracted {
            Extracted::Facts(facts) => {
                builder.add(*facts);
            }
            Extracted::Skipped(warning) => warnings.push(warning),
        }
    }

    let _span = tracing::debug_span!("resolve").entered();
    let (model, builder_warnings) = builder.finish();
    warnings.extend(builder_warnings);

    let summary = model.summary();
    tracing::info!(
        files = files_scanned,
        modules = summary.modules,
        classes = summary.classes,
        functions = summary.functions + summary.methods,
        calls_resolved = summary.calls.internal,
        calls_unresolved = summary.calls.unresolved,
        warnings = warnings.len(),
        "analysis complete"
    );

    Analysis {
        model,
        warnings,
        files_scanned,
    }
}
