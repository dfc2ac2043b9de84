//! Facts model: the structural model of an analyzed source tree.
//!
//! This module provides the aggregated fact base every graph is derived from:
//! - [`Module`]: one per source file, with its raw import statements
//! - [`ClassDecl`]: classes, including nested ones, with base references
//! - [`FunctionDecl`]: functions and methods, including nested ones
//! - [`ImportEdge`], [`CallEdge`], [`InheritsEdge`]: the three edge sets
//!
//! The [`StructuralModel`] stores:
//! - `BTreeMap` tables keyed by qualified name for deterministic iteration
//! - Edge lists sorted by source, then line, then raw text
//!
//! # Identity
//!
//! Every identifier is the qualified name of the thing it names:
//!
//! | Entity | Example id |
//! |--------|------------|
//! | Module | `pkg.shapes` |
//! | Class | `pkg.shapes.Circle` |
//! | Method | `pkg.shapes.Circle.area` |
//! | Nested function | `pkg.shapes.make.helper` |
//!
//! Ids are unique within their table. A second declaration under an existing
//! id is rejected by [`ModelBuilder`] and recorded as a warning.
//!
//! # Resolution
//!
//! Every reference carries its raw text plus a three-valued [`Resolution`]:
//! internal (an id present in the matching table), external (a package
//! outside the tree), or unresolved. Freshly extracted references start out
//! unresolved; [`crate::resolve::resolve`] classifies them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::warning::{AnalysisWarning, WarningKind};

mod summary;

pub use summary::{ModelSummary, ModuleStats, ResolutionCounts};

// ============================================================================
// Visibility
// ============================================================================

/// Visibility derived from the leading-underscore naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    /// Name starts with `_` (dunder names included).
    Private,
}

impl Visibility {
    pub fn from_name(name: &str) -> Self {
        if name.starts_with('_') {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    pub fn is_private(self) -> bool {
        self == Visibility::Private
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Outcome of resolving a textual reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// Resolved to an id present in the model.
    Internal { id: String },
    /// Resolved to a package outside the analyzed tree.
    External { package: String },
    /// Could not be traced.
    Unresolved,
}

impl Resolution {
    pub fn internal(id: impl Into<String>) -> Self {
        Resolution::Internal { id: id.into() }
    }

    pub fn external(package: impl Into<String>) -> Self {
        Resolution::External {
            package: package.into(),
        }
    }

    pub fn internal_id(&self) -> Option<&str> {
        match self {
            Resolution::Internal { id } => Some(id),
            _ => None,
        }
    }

    pub fn external_package(&self) -> Option<&str> {
        match self {
            Resolution::External { package } => Some(package),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Resolution::Unresolved)
    }
}

/// A raw textual reference and what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Text as written in the source.
    pub raw: String,
    #[serde(flatten)]
    pub resolution: Resolution,
}

impl Reference {
    /// An unresolved reference to `raw`.
    pub fn new(raw: impl Into<String>) -> Self {
        Reference {
            raw: raw.into(),
            resolution: Resolution::Unresolved,
        }
    }
}

// ============================================================================
// Imports
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// `import a.b [as c]`
    Import,
    /// `from [.]a import b [as c]`
    From,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImportedName {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ImportedName {
    /// The local name this import binds.
    pub fn bound_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// One import statement exactly as written.
///
/// `import a, b` is recorded as two statements, one per dotted name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImportStatement {
    pub kind: ImportKind,
    /// Dotted module text without leading dots; empty for `from . import x`.
    pub module: String,
    /// Number of leading dots (0 for absolute imports).
    pub level: u32,
    /// Names of a `from` import; empty for plain imports.
    pub names: Vec<ImportedName>,
    /// Alias of a plain `import a.b as c`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub is_star: bool,
    pub line: u32,
}

impl ImportStatement {
    pub fn plain(module: impl Into<String>, alias: Option<String>, line: u32) -> Self {
        ImportStatement {
            kind: ImportKind::Import,
            module: module.into(),
            level: 0,
            names: Vec::new(),
            alias,
            is_star: false,
            line,
        }
    }

    pub fn from_import(module: impl Into<String>, level: u32, names: Vec<ImportedName>, line: u32) -> Self {
        ImportStatement {
            kind: ImportKind::From,
            module: module.into(),
            level,
            names,
            alias: None,
            is_star: false,
            line,
        }
    }

    pub fn star(module: impl Into<String>, level: u32, line: u32) -> Self {
        ImportStatement {
            is_star: true,
            ..ImportStatement::from_import(module, level, Vec::new(), line)
        }
    }

    /// Module text with its leading dots, e.g. `..pkg.mod`.
    pub fn dotted_module(&self) -> String {
        format!("{}{}", ".".repeat(self.level as usize), self.module)
    }

    /// Raw targets this statement imports, one per edge.
    ///
    /// `from m import a, b` targets `m.a` and `m.b`; the resolver narrows each
    /// one to the longest matching module.
    pub fn raw_targets(&self) -> Vec<String> {
        let base = self.dotted_module();
        if self.kind == ImportKind::Import || self.is_star || self.names.is_empty() {
            return vec![base];
        }
        self.names
            .iter()
            .map(|n| {
                if base.ends_with('.') || base.is_empty() {
                    format!("{}{}", base, n.name)
                } else {
                    format!("{}.{}", base, n.name)
                }
            })
            .collect()
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// One source file's module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Qualified module name; also the module id.
    pub name: String,
    /// Root-relative path with forward slashes.
    pub path: String,
    /// Whether the file is a package initializer.
    pub is_package: bool,
    /// SHA-256 of the file text, hex encoded.
    pub content_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Ids of classes declared in the module, nested ones included.
    pub classes: Vec<String>,
    /// Ids of non-method functions declared in the module.
    pub functions: Vec<String>,
    pub imports: Vec<ImportStatement>,
}

impl Module {
    pub fn new(name: impl Into<String>, path: impl Into<String>, is_package: bool) -> Self {
        Module {
            name: name.into(),
            path: path.into(),
            is_package,
            content_hash: String::new(),
            docstring: None,
            classes: Vec::new(),
            functions: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// The package this module's relative imports start from.
    pub fn package(&self) -> Option<&str> {
        if self.is_package {
            Some(&self.name)
        } else {
            self.name.rsplit_once('.').map(|(pkg, _)| pkg)
        }
    }
}

/// Class attribute descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, annotation: Option<String>) -> Self {
        let name = name.into();
        Attribute {
            visibility: Visibility::from_name(&name),
            name,
            annotation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    /// Qualified name; also the class id.
    pub id: String,
    /// Simple name.
    pub name: String,
    pub module: String,
    /// Enclosing class or function id for nested classes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Base classes in declaration order.
    pub bases: Vec<Reference>,
    /// Method ids in declaration order.
    pub methods: Vec<String>,
    pub attributes: Vec<Attribute>,
    /// Decorator expressions without the `@`, uninterpreted.
    pub decorators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub visibility: Visibility,
    pub line: u32,
}

impl ClassDecl {
    pub fn new(module: &str, scope: &str, name: impl Into<String>, line: u32) -> Self {
        let name = name.into();
        ClassDecl {
            id: format!("{}.{}", scope, name),
            module: module.to_string(),
            parent: (scope != module).then(|| scope.to_string()),
            bases: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
            decorators: Vec::new(),
            docstring: None,
            visibility: Visibility::from_name(&name),
            name,
            line,
        }
    }

    pub fn with_bases<I, S>(mut self, bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bases = bases.into_iter().map(Reference::new).collect();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Positional,
    KeywordOnly,
    /// `*args`
    VarPositional,
    /// `**kwargs`
    VarKeyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub has_default: bool,
    pub kind: ParamKind,
}

impl Parameter {
    pub fn positional(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            annotation: None,
            has_default: false,
            kind: ParamKind::Positional,
        }
    }

    /// Render as `name: annotation`, with `*`/`**` prefixes and `=...` for defaults.
    pub fn render(&self) -> String {
        let prefix = match self.kind {
            ParamKind::VarPositional => "*",
            ParamKind::VarKeyword => "**",
            _ => "",
        };
        let mut out = format!("{}{}", prefix, self.name);
        if let Some(ann) = &self.annotation {
            out.push_str(": ");
            out.push_str(ann);
        }
        if self.has_default {
            out.push_str("=...");
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Qualified name; also the function id.
    pub id: String,
    /// Simple name.
    pub name: String,
    pub module: String,
    /// Owning class id, for methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Enclosing function id, for nested functions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub params: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    pub decorators: Vec<String>,
    pub is_async: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub visibility: Visibility,
    pub line: u32,
}

impl FunctionDecl {
    pub fn new(module: &str, scope: &str, name: impl Into<String>, line: u32) -> Self {
        let name = name.into();
        FunctionDecl {
            id: format!("{}.{}", scope, name),
            module: module.to_string(),
            class: None,
            parent: None,
            params: Vec::new(),
            returns: None,
            decorators: Vec::new(),
            is_async: false,
            docstring: None,
            visibility: Visibility::from_name(&name),
            name,
            line,
        }
    }

    pub fn in_class(mut self, class_id: impl Into<String>) -> Self {
        self.class = Some(class_id.into());
        self
    }

    pub fn in_function(mut self, function_id: impl Into<String>) -> Self {
        self.parent = Some(function_id.into());
        self
    }

    pub fn is_method(&self) -> bool {
        self.class.is_some()
    }

    /// Render as `name(params) -> returns`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(Parameter::render).collect();
        let mut out = format!("{}({})", self.name, params.join(", "));
        if let Some(ret) = &self.returns {
            out.push_str(" -> ");
            out.push_str(ret);
        }
        out
    }
}

// ============================================================================
// Edges
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImportEdge {
    /// Importing module id.
    pub importer: String,
    /// Raw target (relative dots kept) and the module it resolved to.
    pub target: Reference,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CallEdge {
    /// Calling function id.
    pub caller: String,
    /// Callee expression text and the function it resolved to.
    pub callee: Reference,
    pub line: u32,
}

impl CallEdge {
    pub fn new(caller: impl Into<String>, callee: impl Into<String>, line: u32) -> Self {
        CallEdge {
            caller: caller.into(),
            callee: Reference::new(callee),
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InheritsEdge {
    /// Child class id.
    pub child: String,
    /// Base reference, resolved to a class id when internal.
    pub parent: Reference,
}

// ============================================================================
// Extraction output
// ============================================================================

/// Everything extracted from one file, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFacts {
    pub module: Module,
    pub classes: Vec<ClassDecl>,
    pub functions: Vec<FunctionDecl>,
    pub calls: Vec<CallEdge>,
}

impl ModuleFacts {
    pub fn new(module: Module) -> Self {
        ModuleFacts {
            module,
            classes: Vec::new(),
            functions: Vec::new(),
            calls: Vec::new(),
        }
    }
}

/// SHA-256 of a file's text, hex encoded.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

// ============================================================================
// Structural Model
// ============================================================================

/// The aggregated, resolved fact base.
///
/// Built once per run by [`ModelBuilder`]; read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralModel {
    pub(crate) modules: BTreeMap<String, Module>,
    pub(crate) classes: BTreeMap<String, ClassDecl>,
    pub(crate) functions: BTreeMap<String, FunctionDecl>,
    pub(crate) inherits: Vec<InheritsEdge>,
    pub(crate) imports: Vec<ImportEdge>,
    pub(crate) calls: Vec<CallEdge>,
}

impl StructuralModel {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn class(&self, id: &str) -> Option<&ClassDecl> {
        self.classes.get(id)
    }

    pub fn function(&self, id: &str) -> Option<&FunctionDecl> {
        self.functions.get(id)
    }

    /// Modules in name order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Classes in id order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.values()
    }

    /// Functions and methods in id order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.values()
    }

    pub fn inherits(&self) -> &[InheritsEdge] {
        &self.inherits
    }

    pub fn imports(&self) -> &[ImportEdge] {
        &self.imports
    }

    pub fn calls(&self) -> &[CallEdge] {
        &self.calls
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Sorted, deduplicated names of external packages referenced by imports.
    pub fn external_packages(&self) -> Vec<String> {
        self.imports
            .iter()
            .filter_map(|e| e.target.resolution.external_package())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Whether a class or function id is private by itself or because an
    /// enclosing class or function below the module is.
    pub fn is_private_symbol(&self, id: &str) -> bool {
        self.local_path(id)
            .is_some_and(|rest| rest.split('.').any(|segment| segment.starts_with('_')))
    }

    /// The part of a class or function id below its module.
    fn local_path<'a>(&self, id: &'a str) -> Option<&'a str> {
        let module = self
            .classes
            .get(id)
            .map(|c| c.module.as_str())
            .or_else(|| self.functions.get(id).map(|f| f.module.as_str()))?;
        id.strip_prefix(module)?.strip_prefix('.')
    }

    /// Aggregate counts for reporting.
    pub fn summary(&self) -> ModelSummary {
        ModelSummary::from_model(self)
    }
}

// ============================================================================
// Model Builder
// ============================================================================

/// Accumulates per-module facts into a [`StructuralModel`].
///
/// Modules must be added in a deterministic order (the pipeline sorts by
/// module name, then path); the first module or symbol seen under an id
/// wins and later ones produce warnings.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    model: StructuralModel,
    warnings: Vec<AnalysisWarning>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one module's facts. Returns `false` if the module was rejected as
    /// a duplicate.
    pub fn add(&mut self, facts: ModuleFacts) -> bool {
        let ModuleFacts {
            mut module,
            classes,
            functions,
            calls,
        } = facts;

        if let Some(existing) = self.model.modules.get(&module.name) {
            let warning = AnalysisWarning::new(
                WarningKind::DuplicateModule,
                format!(
                    "module '{}' already defined by {}; ignoring this file",
                    module.name, existing.path
                ),
            )
            .with_path(module.path.clone())
            .with_module(module.name.clone());
            warning.log();
            self.warnings.push(warning);
            return false;
        }

        let mut kept_classes = BTreeSet::new();
        for class in classes {
            if self.model.classes.contains_key(&class.id) {
                self.duplicate_symbol(&module, "class", &class.id, class.line);
                continue;
            }
            kept_classes.insert(class.id.clone());
            self.model.classes.insert(class.id.clone(), class);
        }
        let mut kept_functions = BTreeSet::new();
        for function in functions {
            if self.model.functions.contains_key(&function.id) {
                self.duplicate_symbol(&module, "function", &function.id, function.line);
                continue;
            }
            kept_functions.insert(function.id.clone());
            self.model.functions.insert(function.id.clone(), function);
        }

        module.classes.retain(|id| kept_classes.remove(id));
        module.functions.retain(|id| kept_functions.remove(id));
        for id in &module.classes {
            if let Some(class) = self.model.classes.get_mut(id) {
                let mut seen = BTreeSet::new();
                class.methods.retain(|m| seen.insert(m.clone()));
            }
        }

        let functions = &self.model.functions;
        let calls: Vec<CallEdge> = calls
            .into_iter()
            .filter(|c| functions.contains_key(&c.caller))
            .collect();
        self.model.calls.extend(calls);
        self.model.modules.insert(module.name.clone(), module);
        true
    }

    /// Record an externally detected problem, e.g. a parse failure.
    pub fn warn(&mut self, warning: AnalysisWarning) {
        warning.log();
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[AnalysisWarning] {
        &self.warnings
    }

    /// Resolve every reference and return the finished model.
    pub fn finish(self) -> (StructuralModel, Vec<AnalysisWarning>) {
        let mut model = self.model;
        crate::resolve::resolve(&mut model);
        (model, self.warnings)
    }

    fn duplicate_symbol(&mut self, module: &Module, what: &str, id: &str, line: u32) {
        let warning = AnalysisWarning::new(
            WarningKind::DuplicateSymbol,
            format!("{} '{}' declared more than once; keeping the first", what, id),
        )
        .with_path(module.path.clone())
        .with_module(module.name.clone())
        .with_line(line);
        warning.log();
        self.warnings.push(warning);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(name: &str, path: &str) -> ModuleFacts {
        ModuleFacts::new(Module::new(name, path, false))
    }

    mod visibility {
        use super::*;

        #[test]
        fn leading_underscore_is_private() {
            assert_eq!(Visibility::from_name("_helper"), Visibility::Private);
            assert_eq!(Visibility::from_name("__init__"), Visibility::Private);
            assert_eq!(Visibility::from_name("run"), Visibility::Public);
        }

        #[test]
        fn nested_under_private_is_private() {
            let mut f = facts("m", "m.py");
            let class = ClassDecl::new("m", "m", "_Impl", 1);
            let method = FunctionDecl::new("m", "m._Impl", "run", 2).in_class("m._Impl");
            let public = FunctionDecl::new("m", "m", "api", 5);
            f.module.classes.push(class.id.clone());
            f.module.functions.push(public.id.clone());
            f.classes.push(class);
            f.functions.extend([method, public]);

            let mut builder = ModelBuilder::new();
            builder.add(f);
            let (model, _) = builder.finish();
            assert!(model.is_private_symbol("m._Impl.run"));
            assert!(!model.is_private_symbol("m.api"));
        }
    }

    mod imports {
        use super::*;

        #[test]
        fn raw_targets_per_name() {
            let stmt = ImportStatement::from_import(
                "pkg",
                0,
                vec![
                    ImportedName {
                        name: "a".into(),
                        alias: None,
                    },
                    ImportedName {
                        name: "b".into(),
                        alias: Some("c".into()),
                    },
                ],
                1,
            );
            assert_eq!(stmt.raw_targets(), vec!["pkg.a", "pkg.b"]);
            assert_eq!(stmt.names[1].bound_name(), "c");
        }

        #[test]
        fn relative_targets_keep_dots() {
            let stmt = ImportStatement::from_import(
                "",
                1,
                vec![ImportedName {
                    name: "x".into(),
                    alias: None,
                }],
                1,
            );
            assert_eq!(stmt.raw_targets(), vec![".x"]);
            assert_eq!(ImportStatement::star("util", 2, 1).raw_targets(), vec!["..util"]);
        }

        #[test]
        fn module_package() {
            assert_eq!(Module::new("a.b.c", "a/b/c.py", false).package(), Some("a.b"));
            assert_eq!(Module::new("a.b", "a/b/__init__.py", true).package(), Some("a.b"));
            assert_eq!(Module::new("top", "top.py", false).package(), None);
        }
    }

    mod builder {
        use super::*;

        #[test]
        fn duplicate_module_keeps_first() {
            let mut builder = ModelBuilder::new();
            assert!(builder.add(facts("pkg", "pkg.py")));
            assert!(!builder.add(facts("pkg", "pkg/__init__.py")));
            let (model, warnings) = builder.finish();
            assert_eq!(model.module("pkg").unwrap().path, "pkg.py");
            assert_eq!(warnings.len(), 1);
            assert_eq!(warnings[0].kind, WarningKind::DuplicateModule);
            assert_eq!(warnings[0].path.as_deref(), Some("pkg/__init__.py"));
        }

        #[test]
        fn duplicate_function_keeps_first() {
            let mut f = facts("m", "m.py");
            let first = FunctionDecl::new("m", "m", "f", 1);
            let second = FunctionDecl::new("m", "m", "f", 4);
            f.module.functions = vec![first.id.clone(), second.id.clone()];
            f.functions = vec![first, second];

            let mut builder = ModelBuilder::new();
            builder.add(f);
            let (model, warnings) = builder.finish();
            assert_eq!(model.function("m.f").unwrap().line, 1);
            assert_eq!(model.module("m").unwrap().functions, vec!["m.f"]);
            assert_eq!(warnings.len(), 1);
            assert_eq!(warnings[0].kind, WarningKind::DuplicateSymbol);
            assert_eq!(warnings[0].line, Some(4));
        }

        #[test]
        fn signature_rendering() {
            let mut f = FunctionDecl::new("m", "m", "area", 1);
            f.params = vec![
                Parameter::positional("self"),
                Parameter {
                    name: "scale".into(),
                    annotation: Some("float".into()),
                    has_default: true,
                    kind: ParamKind::Positional,
                },
                Parameter {
                    name: "rest".into(),
                    annotation: None,
                    has_default: false,
                    kind: ParamKind::VarKeyword,
                },
            ];
            f.returns = Some("float".into());
            assert_eq!(f.signature(), "area(self, scale: float=..., **rest) -> float");
        }

        #[test]
        fn content_hash_is_stable() {
            assert_eq!(content_hash("x = 1\n"), content_hash("x = 1\n"));
            assert_ne!(content_hash("x = 1\n"), content_hash("x = 2\n"));
            assert_eq!(content_hash("").len(), 64);
        }
    }
}
