//! Core infrastructure for archgraph.
//!
//! This crate provides the language-agnostic half of the analysis:
//! - Source walker with glob excludes and symlink-loop protection
//! - Structural model of modules, classes, functions and their edges
//! - Symbol resolver classifying every reference as internal, external or unresolved
//! - Four graph builders sharing one interface and one option bag
//! - Analysis pipeline with parallel extraction and cooperative cancellation
//! - Error types, error codes and JSON output envelopes
//! - Language adapter trait for pluggable language support

pub mod adapter;
pub mod cancel;
pub mod error;
pub mod facts;
pub mod graph;
pub mod output;
pub mod pipeline;
pub mod resolve;
pub mod warning;
pub mod workspace;
