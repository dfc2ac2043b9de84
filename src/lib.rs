//! archgraph: structural graphs of Python source trees.
//!
//! The analysis itself lives in the workspace crates and is re-exported
//! here:
//! - [`archgraph_core`]: walker, structural model, resolver, graph builders
//! - [`archgraph_python`]: the Python language adapter
//!
//! This crate adds the command-line front door and config file loading.

pub use archgraph_core::adapter;
pub use archgraph_core::cancel;
pub use archgraph_core::error;
pub use archgraph_core::facts;
pub use archgraph_core::graph;
pub use archgraph_core::output;
pub use archgraph_core::pipeline;
pub use archgraph_core::resolve;
pub use archgraph_core::warning;
pub use archgraph_core::workspace;

pub use archgraph_python as python;

pub mod cli;
pub mod config;
