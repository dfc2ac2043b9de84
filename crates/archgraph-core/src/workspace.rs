//! Source walker: deterministic enumeration of source files under a root.
//!
//! The walker produces the file identities an analysis run works on:
//! - Only files with a configured extension are considered
//! - Exclude globs apply to directories (pruning) and to every file
//! - Symlinks are followed, with a visited-directory guard
//! - Output is sorted by root-relative path
//!
//! Only the root itself can make the walk fail. Problems below the root
//! (permission errors, symlink loops) become [`AnalysisWarning`]s.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::warning::{AnalysisWarning, WarningKind};

// ============================================================================
// Errors
// ============================================================================

/// Fatal walker errors. All of them concern the root or the configuration.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("root not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("root is not a directory: {}", path.display())]
    RootNotDirectory { path: PathBuf },

    #[error("cannot read root {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid exclude pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

// ============================================================================
// Configuration
// ============================================================================

/// Directory and file names skipped unless `use_default_excludes` is off.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".nox",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "node_modules",
    "build",
    "dist",
    ".eggs",
    "*.egg-info",
];

/// Walker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkConfig {
    /// File extensions (without the dot) to collect.
    pub extensions: Vec<String>,
    /// User exclude globs.
    pub exclude_patterns: Vec<String>,
    /// Whether [`DEFAULT_EXCLUDES`] apply.
    pub use_default_excludes: bool,
    /// Whether symlinks are followed.
    pub follow_symlinks: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            extensions: Vec::new(),
            exclude_patterns: Vec::new(),
            use_default_excludes: true,
            follow_symlinks: true,
        }
    }
}

impl WalkConfig {
    /// Config collecting files with the given extension.
    pub fn for_extension(ext: impl Into<String>) -> Self {
        WalkConfig {
            extensions: vec![ext.into()],
            ..Default::default()
        }
    }

    pub fn with_excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_default_excludes(mut self, enabled: bool) -> Self {
        self.use_default_excludes = enabled;
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

// ============================================================================
// Exclusion
// ============================================================================

/// Compiled exclude globs.
///
/// Every pattern is tested against the root-relative forward-slash path.
/// Patterns without a `/` are also tested against the bare entry name, so
/// `test_*.py` excludes test files at any depth.
#[derive(Debug, Clone)]
pub struct ExcludeMatcher {
    paths: GlobSet,
    names: GlobSet,
}

impl ExcludeMatcher {
    pub fn new(config: &WalkConfig) -> Result<Self, WalkError> {
        let mut paths = GlobSetBuilder::new();
        let mut names = GlobSetBuilder::new();

        let defaults = if config.use_default_excludes {
            DEFAULT_EXCLUDES
        } else {
            &[]
        };
        let patterns = defaults
            .iter()
            .copied()
            .chain(config.exclude_patterns.iter().map(String::as_str));

        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| WalkError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.kind().to_string(),
            })?;
            if !pattern.contains('/') {
                names.add(glob.clone());
            }
            paths.add(glob);
        }

        let build = |builder: GlobSetBuilder| {
            builder.build().map_err(|e| WalkError::InvalidPattern {
                pattern: e.glob().unwrap_or_default().to_string(),
                message: e.kind().to_string(),
            })
        };
        Ok(ExcludeMatcher {
            paths: build(paths)?,
            names: build(names)?,
        })
    }

    /// Whether a root-relative path (forward slashes) is excluded.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        if self.paths.is_match(relative_path) {
            return true;
        }
        let name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        self.names.is_match(name)
    }
}

// ============================================================================
// File identities
// ============================================================================

/// How a language names the module a file defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleIdentity {
    /// Package-qualified module name, e.g. `pkg.sub.mod`.
    pub name: String,
    /// Whether the file is a package initializer.
    pub is_package: bool,
}

/// One source file found by the walker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Root-relative path with forward slashes.
    pub relative_path: String,
    /// Qualified module name.
    pub module_name: String,
    pub is_package: bool,
}

/// Everything a walk produced.
#[derive(Debug, Clone)]
pub struct WalkOutput {
    /// Canonical root directory.
    pub root: PathBuf,
    /// Files sorted by relative path.
    pub files: Vec<SourceFile>,
    pub warnings: Vec<AnalysisWarning>,
}

// ============================================================================
// Walking
// ============================================================================

/// Walk `root` and collect source files.
///
/// `identify` maps a root-relative path to its module identity; files it
/// rejects (returns `None` for) are skipped.
pub fn walk<F>(root: &Path, config: &WalkConfig, identify: F) -> Result<WalkOutput, WalkError>
where
    F: Fn(&str) -> Option<ModuleIdentity>,
{
    let root = check_root(root)?;
    let matcher = ExcludeMatcher::new(config)?;

    let mut visited_dirs = HashSet::new();
    let mut files = Vec::new();
    let mut warnings = Vec::new();

    // Sorted so that, of two paths reaching one directory, the first by name
    // is the one kept.
    let walker = WalkDir::new(&root)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                visited_dirs.insert(dir_key(entry.path()));
                return true;
            }
            let relative = relative_str(&root, entry.path());
            if matcher.is_excluded(&relative) {
                tracing::debug!(path = %relative, "excluded");
                return false;
            }
            if entry.file_type().is_dir() && !visited_dirs.insert(dir_key(entry.path())) {
                tracing::debug!(path = %relative, "directory already visited");
                return false;
            }
            true
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| relative_str(&root, p))
                    .unwrap_or_default();
                let message = if err.loop_ancestor().is_some() {
                    "symlink loop".to_string()
                } else {
                    err.to_string()
                };
                let warning =
                    AnalysisWarning::new(WarningKind::WalkFailure, message).with_path(path);
                warning.log();
                warnings.push(warning);
                continue;
            }
        };
        if !entry.file_type().is_file() || !has_extension(&entry, &config.extensions) {
            continue;
        }

        let relative = relative_str(&root, entry.path());
        match identify(&relative) {
            Some(identity) => files.push(SourceFile {
                path: entry.path().to_path_buf(),
                relative_path: relative,
                module_name: identity.name,
                is_package: identity.is_package,
            }),
            None => tracing::debug!(path = %relative, "no module name for file, skipped"),
        }
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    tracing::info!(root = %root.display(), files = files.len(), "walk complete");

    Ok(WalkOutput {
        root,
        files,
        warnings,
    })
}

fn check_root(root: &Path) -> Result<PathBuf, WalkError> {
    let metadata = match fs::metadata(root) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(WalkError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(WalkError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            })
        }
    };
    if !metadata.is_dir() {
        return Err(WalkError::RootNotDirectory {
            path: root.to_path_buf(),
        });
    }
    fs::read_dir(root).map_err(|source| WalkError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    root.canonicalize()
        .map_err(|source| WalkError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })
}

fn has_extension(entry: &DirEntry, extensions: &[String]) -> bool {
    entry
        .path()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want == ext))
}

fn relative_str(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/")
}

/// Identity of a directory for the visited guard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DirKey {
    #[cfg(unix)]
    Inode(u64, u64),
    Path(PathBuf),
}

#[cfg(unix)]
fn dir_key(path: &Path) -> DirKey {
    use std::os::unix::fs::MetadataExt;
    match fs::metadata(path) {
        Ok(m) => DirKey::Inode(m.dev(), m.ino()),
        Err(_) => DirKey::Path(path.to_path_buf()),
    }
}

#[cfg(not(unix))]
fn dir_key(path: &Path) -> DirKey {
    DirKey::Path(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
}

// ============================================================================
// Tests
// ============================================================================
