//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core Infrastructure Types
// ============================================================================

// facts module - structural model and its records
use archgraph::facts::{
    content_hash, Attribute, CallEdge, ClassDecl, FunctionDecl, ImportEdge, ImportKind,
    ImportStatement, ImportedName, InheritsEdge, ModelBuilder, ModelSummary, Module, ModuleFacts,
    ModuleStats, ParamKind, Parameter, Reference, Resolution, ResolutionCounts, StructuralModel,
    Visibility,
};

// error module - error types and codes
use archgraph::error::{ArchError, OutputErrorCode};

// output module - JSON output types
use archgraph::output::{
    emit_response, AnalyzeResponse, ErrorInfo, ErrorResponse, GraphResponse, KindInfo,
    KindsResponse, ModelResponse, SCHEMA_VERSION,
};

// graph module - graph model, option bag and builders
use archgraph::graph::{
    CallGraphBuilder, ClassHierarchyBuilder, DependencyGraphBuilder, DirectedGraph, Edge,
    EdgeKind, GraphBuilder, GraphError, GraphKind, GraphOptions, Member, MemberKind, Node,
    NodeKind, PackageTreeBuilder,
};

// workspace module - source walker
use archgraph::workspace::{
    walk, ExcludeMatcher, ModuleIdentity, SourceFile, WalkConfig, WalkError, WalkOutput,
    DEFAULT_EXCLUDES,
};

// pipeline and friends
use archgraph::adapter::{ExtractFailure, LanguageAdapter};
use archgraph::cancel::{Cancellable, CancellationToken};
use archgraph::pipeline::{analyze, analyze_sources, Analysis, AnalysisConfig, AnalysisError};
use archgraph::resolve::resolve;
use archgraph::warning::{AnalysisWarning, WarningKind};

// ============================================================================
// Language Adapters
// ============================================================================

use archgraph::python::files::{is_identifier, module_identity_for_path, MAIN_MODULE};
use archgraph::python::{extract_module, ExtractError, PythonAdapter};

// ============================================================================
// Front Door
// ============================================================================

use archgraph::cli::{run_analysis, run_analyze, run_graph, AnalysisRequest, GraphFlags};
use archgraph::config::{ArchgraphConfig, ConfigError, CONFIG_FILE_NAME};

#[test]
fn api_surface_compiles() {
    // This test exists only to ensure the imports above compile.
}
