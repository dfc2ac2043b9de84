//! Recoverable analysis warnings.
//!
//! A warning records something the run could not use (an unreadable file, a
//! syntax error, a duplicate module) without aborting the run. Warnings are
//! returned next to the successful result so the caller decides whether an
//! "analysis with warnings" is acceptable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of recoverable problem occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A directory entry below the root could not be visited.
    WalkFailure,
    /// A file could not be read or is not UTF-8.
    ReadFailure,
    /// A file is not valid source; its module is absent from the model.
    ParseFailure,
    /// Two files map to the same module name; the first one is kept.
    DuplicateModule,
    /// A class or function was declared twice under one qualified name.
    DuplicateSymbol,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WarningKind::WalkFailure => "walk_failure",
            WarningKind::ReadFailure => "read_failure",
            WarningKind::ParseFailure => "parse_failure",
            WarningKind::DuplicateModule => "duplicate_module",
            WarningKind::DuplicateSymbol => "duplicate_symbol",
        };
        f.write_str(s)
    }
}

/// A single recoverable problem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnalysisWarning {
    pub kind: WarningKind,
    /// Root-relative path of the file involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Module name involved, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// 1-based line, for parse failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub message: String,
}

impl AnalysisWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        AnalysisWarning {
            kind,
            path: None,
            module: None,
            line: None,
            message: message.into(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Emit this warning through `tracing`.
    pub(crate) fn log(&self) {
        tracing::warn!(
            kind = %self.kind,
            path = self.path.as_deref().unwrap_or(""),
            module = self.module.as_deref().unwrap_or(""),
            "{}",
            self.message
        );
    }
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(path) = &self.path {
            write!(f, " {}", path)?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
        }
        write!(f, ": {}", self.message)
    }
}
