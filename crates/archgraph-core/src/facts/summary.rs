//! Aggregate counts over a structural model.

use serde::{Deserialize, Serialize};

use super::{Resolution, StructuralModel};

/// How many references ended up in each resolution class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionCounts {
    pub internal: usize,
    pub external: usize,
    pub unresolved: usize,
}

impl ResolutionCounts {
    fn count<'a>(resolutions: impl Iterator<Item = &'a Resolution>) -> Self {
        let mut counts = ResolutionCounts::default();
        for resolution in resolutions {
            match resolution {
                Resolution::Internal { .. } => counts.internal += 1,
                Resolution::External { .. } => counts.external += 1,
                Resolution::Unresolved => counts.unresolved += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.internal + self.external + self.unresolved
    }
}

/// Per-module row of the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStats {
    pub module: String,
    pub path: String,
    pub classes: usize,
    pub functions: usize,
    pub imports: usize,
}

/// Model-wide counts, suitable for reports and for handing to collaborators
/// that only need aggregate numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub modules: usize,
    pub classes: usize,
    pub functions: usize,
    pub methods: usize,
    pub imports: ResolutionCounts,
    pub calls: ResolutionCounts,
    pub bases: ResolutionCounts,
    pub external_packages: Vec<String>,
    pub per_module: Vec<ModuleStats>,
}

impl ModelSummary {
    pub fn from_model(model: &StructuralModel) -> Self {
        let methods = model.functions().filter(|f| f.is_method()).count();
        let per_module = model
            .modules()
            .map(|m| ModuleStats {
                module: m.name.clone(),
                path: m.path.clone(),
                classes: m.classes.len(),
                functions: m.functions.len(),
                imports: m.imports.len(),
            })
            .collect();

        ModelSummary {
            modules: model.module_count(),
            classes: model.class_count(),
            functions: model.function_count() - methods,
            methods,
            imports: ResolutionCounts::count(model.imports().iter().map(|e| &e.target.resolution)),
            calls: ResolutionCounts::count(model.calls().iter().map(|e| &e.callee.resolution)),
            bases: ResolutionCounts::count(model.inherits().iter().map(|e| &e.parent.resolution)),
            external_packages: model.external_packages(),
            per_module,
        }
    }
}
