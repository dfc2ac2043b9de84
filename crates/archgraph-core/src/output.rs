//! JSON output types for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** every response has `status` as its first field
//! 2. **Deterministic:** same input, same bytes (all collections are sorted)
//! 3. **Versioned:** `schema_version` enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{ArchError, OutputErrorCode};
use crate::facts::{ModelSummary, StructuralModel};
use crate::graph::{DirectedGraph, GraphKind, GraphOptions};
use crate::warning::AnalysisWarning;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Response for `analyze`: the model summary.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub status: String,
    pub schema_version: String,
    /// Analyzed root as given.
    pub root: String,
    pub files_scanned: usize,
    pub summary: ModelSummary,
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalyzeResponse {
    pub fn new(
        root: impl Into<String>,
        files_scanned: usize,
        summary: ModelSummary,
        warnings: Vec<AnalysisWarning>,
    ) -> Self {
        AnalyzeResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            root: root.into(),
            files_scanned,
            summary,
            warnings,
        }
    }
}

/// Response for `model`: the full structural model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelResponse<'a> {
    pub status: String,
    pub schema_version: String,
    pub root: String,
    pub model: &'a StructuralModel,
    pub warnings: Vec<AnalysisWarning>,
}

impl<'a> ModelResponse<'a> {
    pub fn new(
        root: impl Into<String>,
        model: &'a StructuralModel,
        warnings: Vec<AnalysisWarning>,
    ) -> Self {
        ModelResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            root: root.into(),
            model,
            warnings,
        }
    }
}

/// Response for `graph`: one derived graph and the options that shaped it.
#[derive(Debug, Clone, Serialize)]
pub struct GraphResponse {
    pub status: String,
    pub schema_version: String,
    pub root: String,
    pub options: GraphOptions,
    pub graph: DirectedGraph,
    pub warnings: Vec<AnalysisWarning>,
}

impl GraphResponse {
    pub fn new(
        root: impl Into<String>,
        options: GraphOptions,
        graph: DirectedGraph,
        warnings: Vec<AnalysisWarning>,
    ) -> Self {
        GraphResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            root: root.into(),
            options,
            graph,
            warnings,
        }
    }
}

/// One entry of the `kinds` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindInfo {
    pub kind: GraphKind,
    pub description: String,
}

/// Response for `kinds`.
#[derive(Debug, Clone, Serialize)]
pub struct KindsResponse {
    pub status: String,
    pub schema_version: String,
    pub kinds: Vec<KindInfo>,
}

impl KindsResponse {
    pub fn new() -> Self {
        KindsResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            kinds: GraphKind::ALL
                .iter()
                .map(|kind| KindInfo {
                    kind: *kind,
                    description: kind.description().to_string(),
                })
                .collect(),
        }
    }
}

impl Default for KindsResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Error details inside an [`ErrorResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable numeric code, also the process exit code.
    pub code: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn from_error(err: &ArchError) -> Self {
        let details = match err {
            ArchError::InvalidArguments { details, .. } => details.clone(),
            ArchError::InvalidOption { option, .. } => Some(serde_json::json!({ "option": option })),
            ArchError::RootUnavailable { path, .. } => Some(serde_json::json!({ "path": path })),
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &ArchError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
