//! Python language support for archgraph.
//!
//! This crate provides:
//! - Module naming for Python paths (packages, `__init__.py`, `__main__`)
//! - The tree-sitter based Module Extractor
//! - [`PythonAdapter`], the [`LanguageAdapter`] the pipeline runs

use archgraph_core::adapter::LanguageAdapter;
use archgraph_core::facts::ModuleFacts;
use archgraph_core::workspace::ModuleIdentity;

pub mod extract;
pub mod files;

pub use extract::{extract_module, ExtractError};

/// Language adapter for Python source trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonAdapter;

impl PythonAdapter {
    pub fn new() -> Self {
        PythonAdapter
    }
}

impl LanguageAdapter for PythonAdapter {
    type Error = ExtractError;

    fn language(&self) -> &'static str {
        "python"
    }

    fn extension(&self) -> &'static str {
        "py"
    }

    fn module_identity(&self, relative_path: &str) -> Option<ModuleIdentity> {
        files::module_identity_for_path(relative_path)
    }

    fn extract(
        &self,
        identity: &ModuleIdentity,
        relative_path: &str,
        text: &str,
    ) -> Result<ModuleFacts, ExtractError> {
        extract_module(identity, relative_path, text)
    }
}
