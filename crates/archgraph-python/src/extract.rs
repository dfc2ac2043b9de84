//! Module Extractor: one Python file's text to [`ModuleFacts`].
//!
//! Parsing uses tree-sitter-python. A fresh parser is created per call, so
//! extraction is safe on any worker thread and keeps no state between files.
//!
//! What is recorded:
//! - classes with raw base text, decorators, docstring, methods and
//!   attributes (class-body assignments and `self.<name>` assignments)
//! - functions and methods with parameters, annotations, `async`, decorators
//! - every import statement in the file, wherever it appears
//! - every call expression inside a function body, keyed by its callee text
//!
//! Nested definitions are flattened with dotted ids that encode nesting.
//! Nothing is resolved here; every reference keeps its raw text only.

use thiserror::Error;
use tree_sitter::{Node, Parser};

use archgraph_core::adapter::ExtractFailure;
use archgraph_core::facts::{
    Attribute, CallEdge, ClassDecl, FunctionDecl, ImportStatement, ImportedName, Module,
    ModuleFacts, ParamKind, Parameter, Reference,
};
use archgraph_core::workspace::ModuleIdentity;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The file is not valid Python. Positions are 1-based.
    #[error("invalid syntax at line {line}, column {column}")]
    Syntax { line: u32, column: u32 },

    /// The parser itself could not run.
    #[error("python parser unavailable: {message}")]
    Parser { message: String },
}

impl ExtractFailure for ExtractError {
    fn line(&self) -> Option<u32> {
        match self {
            ExtractError::Syntax { line, .. } => Some(*line),
            ExtractError::Parser { .. } => None,
        }
    }

    fn is_fatal(&self) -> bool {
        matches!(self, ExtractError::Parser { .. })
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Extract the facts of one module.
pub fn extract_module(
    identity: &ModuleIdentity,
    relative_path: &str,
    source: &str,
) -> Result<ModuleFacts, ExtractError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::language())
        .map_err(|e| ExtractError::Parser {
            message: e.to_string(),
        })?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ExtractError::Parser {
            message: "parse produced no tree".to_string(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let (line, column) = first_error(root).unwrap_or((1, 1));
        tracing::debug!(path = relative_path, line, column, "syntax error");
        return Err(ExtractError::Syntax { line, column });
    }

    let module = Module::new(identity.name.clone(), relative_path, identity.is_package);
    let mut extractor = Extractor {
        source,
        facts: ModuleFacts::new(module),
    };
    extractor.facts.module.docstring = extractor.docstring(root);
    let scope = Scope {
        id: identity.name.clone(),
        kind: ScopeKind::Module,
    };
    extractor.visit_statements(root, &scope);
    tracing::debug!(
        module = %identity.name,
        classes = extractor.facts.classes.len(),
        functions = extractor.facts.functions.len(),
        calls = extractor.facts.calls.len(),
        "extracted module"
    );
    Ok(extractor.facts)
}

/// Position of the first error or missing node in document order.
fn first_error(root: Node<'_>) -> Option<(u32, u32)> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return Some((pos.row as u32 + 1, pos.column as u32 + 1));
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

// ============================================================================
// Extractor
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Module,
    /// Index of the class in `facts.classes`.
    Class(usize),
    Function,
}

/// The definition whose body is being visited.
#[derive(Debug, Clone)]
struct Scope {
    id: String,
    kind: ScopeKind,
}

/// Statements whose nested blocks may hold definitions or imports.
const COMPOUND_STATEMENTS: &[&str] = &[
    "block",
    "if_statement",
    "elif_clause",
    "else_clause",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "with_statement",
    "for_statement",
    "while_statement",
    "match_statement",
    "case_clause",
];

struct Extractor<'s> {
    source: &'s str,
    facts: ModuleFacts,
}

impl<'s> Extractor<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    /// Visit the statements directly under `node`, descending through
    /// compound statements but not into other definitions' bodies.
    fn visit_statements(&mut self, node: Node<'_>, scope: &Scope) {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "class_definition" => self.class(child, scope, Vec::new()),
                "function_definition" => self.function(child, scope, Vec::new()),
                "decorated_definition" => self.decorated(child, scope),
                "import_statement" => self.import(child),
                "import_from_statement" => self.import_from(child),
                "expression_statement" => {
                    if let ScopeKind::Class(index) = scope.kind {
                        self.class_attributes(child, index);
                    }
                }
                kind if COMPOUND_STATEMENTS.contains(&kind) => self.visit_statements(child, scope),
                _ => {}
            }
        }
    }

    fn decorated(&mut self, node: Node<'_>, scope: &Scope) {
        let mut cursor = node.walk();
        let decorators: Vec<String> = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "decorator")
            .map(|c| self.text(c).trim_start_matches('@').trim().to_string())
            .collect();
        let Some(definition) = node.child_by_field_name("definition") else {
            return;
        };
        match definition.kind() {
            "class_definition" => self.class(definition, scope, decorators),
            "function_definition" => self.function(definition, scope, decorators),
            _ => {}
        }
    }

    // ------------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------------

    fn class(&mut self, node: Node<'_>, scope: &Scope, decorators: Vec<String>) {
        let Some(name) = node.child_by_field_name("name").map(|n| self.text(n)) else {
            return;
        };
        let module = self.facts.module.name.clone();
        let mut decl = ClassDecl::new(&module, &scope.id, name, line(node));
        decl.decorators = decorators;

        if let Some(args) = node.child_by_field_name("superclasses") {
            let mut cursor = args.walk();
            for arg in args.named_children(&mut cursor) {
                match arg.kind() {
                    "keyword_argument" | "list_splat" | "dictionary_splat" | "comment" => {}
                    _ => decl.bases.push(Reference::new(self.base_text(arg))),
                }
            }
        }

        let body = node.child_by_field_name("body");
        decl.docstring = body.and_then(|b| self.docstring(b));

        let id = decl.id.clone();
        self.facts.module.classes.push(id.clone());
        let index = self.facts.classes.len();
        self.facts.classes.push(decl);

        if let Some(body) = body {
            let scope = Scope {
                id,
                kind: ScopeKind::Class(index),
            };
            self.visit_statements(body, &scope);
        }
    }

    /// Base expression text with subscripts stripped: `Generic[T]` is `Generic`.
    fn base_text(&self, node: Node<'_>) -> String {
        let mut node = node;
        while node.kind() == "subscript" {
            match node.child_by_field_name("value") {
                Some(value) => node = value,
                None => break,
            }
        }
        self.text(node).trim().to_string()
    }

    /// Class-body assignments: `x = 1`, `x: int = 1`, `x: int`, `a = b = 1`.
    fn class_attributes(&mut self, statement: Node<'_>, index: usize) {
        let mut cursor = statement.walk();
        let assignments: Vec<Node<'_>> = statement
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "assignment")
            .collect();
        for assignment in assignments {
            let mut current = Some(assignment);
            while let Some(node) = current {
                if let Some(left) = node.child_by_field_name("left") {
                    if left.kind() == "identifier" {
                        let name = self.text(left);
                        let annotation = self.annotation(node);
                        self.add_attribute(index, name, annotation);
                    }
                }
                current = node
                    .child_by_field_name("right")
                    .filter(|r| r.kind() == "assignment");
            }
        }
    }

    fn annotation(&self, assignment: Node<'_>) -> Option<String> {
        assignment
            .child_by_field_name("type")
            .map(|t| self.text(t).trim().to_string())
    }

    /// Record an attribute; the first occurrence of a name wins, but a later
    /// annotation fills in a missing one.
    fn add_attribute(&mut self, index: usize, name: &str, annotation: Option<String>) {
        let Some(class) = self.facts.classes.get_mut(index) else {
            return;
        };
        match class.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => {
                if existing.annotation.is_none() {
                    existing.annotation = annotation;
                }
            }
            None => class.attributes.push(Attribute::new(name, annotation)),
        }
    }

    // ------------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------------

    fn function(&mut self, node: Node<'_>, scope: &Scope, decorators: Vec<String>) {
        let Some(name) = node.child_by_field_name("name").map(|n| self.text(n)) else {
            return;
        };
        let module = self.facts.module.name.clone();
        let mut decl = FunctionDecl::new(&module, &scope.id, name, line(node));
        decl.decorators = decorators;
        decl.is_async = node.child(0).is_some_and(|c| c.kind() == "async");
        decl.params = node
            .child_by_field_name("parameters")
            .map(|p| self.parameters(p))
            .unwrap_or_default();
        decl.returns = node
            .child_by_field_name("return_type")
            .map(|r| self.text(r).trim().to_string());
        let body = node.child_by_field_name("body");
        decl.docstring = body.and_then(|b| self.docstring(b));

        let owner = match scope.kind {
            ScopeKind::Class(index) => {
                decl = decl.in_class(scope.id.clone());
                Some(index)
            }
            ScopeKind::Function => {
                decl = decl.in_function(scope.id.clone());
                None
            }
            ScopeKind::Module => None,
        };

        let id = decl.id.clone();
        match owner {
            Some(index) => {
                if let Some(class) = self.facts.classes.get_mut(index) {
                    class.methods.push(id.clone());
                }
            }
            None => self.facts.module.functions.push(id.clone()),
        }
        self.facts.functions.push(decl);

        let Some(body) = body else {
            return;
        };
        let scope = Scope {
            id: id.clone(),
            kind: ScopeKind::Function,
        };
        self.visit_statements(body, &scope);
        self.body_facts(body, &id, owner);
    }

    fn parameters(&self, node: Node<'_>) -> Vec<Parameter> {
        let mut params = Vec::new();
        let mut keyword_only = false;
        let positional = |keyword_only: bool| {
            if keyword_only {
                ParamKind::KeywordOnly
            } else {
                ParamKind::Positional
            }
        };

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "identifier" => params.push(Parameter {
                    kind: positional(keyword_only),
                    ..Parameter::positional(self.text(child))
                }),
                "default_parameter" | "typed_default_parameter" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    params.push(Parameter {
                        name: self.text(name).to_string(),
                        annotation: self.annotation(child),
                        has_default: true,
                        kind: positional(keyword_only),
                    });
                }
                "typed_parameter" => {
                    let Some(target) = child.named_child(0) else {
                        continue;
                    };
                    let (name, kind) = match target.kind() {
                        "list_splat_pattern" => {
                            keyword_only = true;
                            (self.splat_name(target), ParamKind::VarPositional)
                        }
                        "dictionary_splat_pattern" => {
                            (self.splat_name(target), ParamKind::VarKeyword)
                        }
                        _ => (self.text(target).to_string(), positional(keyword_only)),
                    };
                    params.push(Parameter {
                        name,
                        annotation: self.annotation(child),
                        has_default: false,
                        kind,
                    });
                }
                "list_splat_pattern" => {
                    keyword_only = true;
                    params.push(Parameter {
                        kind: ParamKind::VarPositional,
                        ..Parameter::positional(self.splat_name(child))
                    });
                }
                "dictionary_splat_pattern" => params.push(Parameter {
                    kind: ParamKind::VarKeyword,
                    ..Parameter::positional(self.splat_name(child))
                }),
                "keyword_separator" | "*" => keyword_only = true,
                _ => {}
            }
        }
        params
    }

    /// Name inside `*args` or `**kwargs`.
    fn splat_name(&self, node: Node<'_>) -> String {
        self.text(node).trim_start_matches('*').trim().to_string()
    }

    /// Calls and `self.<name>` assignments inside one function body, not
    /// entering nested definitions.
    fn body_facts(&mut self, body: Node<'_>, caller: &str, class_index: Option<usize>) {
        let mut calls = Vec::new();
        let mut self_attributes = Vec::new();

        let mut stack = vec![body];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "function_definition" | "class_definition" => continue,
                "call" => {
                    if let Some(callee) = node.child_by_field_name("function") {
                        let raw = self.text(callee).trim();
                        if !raw.is_empty() {
                            calls.push(CallEdge::new(caller, raw, line(node)));
                        }
                    }
                }
                "assignment" if class_index.is_some() => {
                    if let Some(name) = node
                        .child_by_field_name("left")
                        .and_then(|left| self.self_attribute(left))
                    {
                        self_attributes.push((name, self.annotation(node)));
                    }
                }
                _ => {}
            }
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        self.facts.calls.extend(calls);
        if let Some(index) = class_index {
            for (name, annotation) in self_attributes {
                self.add_attribute(index, name, annotation);
            }
        }
    }

    /// `name` for an assignment target of the form `self.name`.
    fn self_attribute(&self, target: Node<'_>) -> Option<&'s str> {
        if target.kind() != "attribute" {
            return None;
        }
        let object = target.child_by_field_name("object")?;
        if object.kind() != "identifier" || self.text(object) != "self" {
            return None;
        }
        target.child_by_field_name("attribute").map(|a| self.text(a))
    }

    // ------------------------------------------------------------------------
    // Imports
    // ------------------------------------------------------------------------

    /// `import a.b, c as d`: one statement per dotted name.
    fn import(&mut self, node: Node<'_>) {
        let line = line(node);
        let mut cursor = node.walk();
        let names: Vec<Node<'_>> = node.children_by_field_name("name", &mut cursor).collect();
        for name in names {
            let (module, alias) = self.name_and_alias(name);
            if !module.is_empty() {
                self.facts
                    .module
                    .imports
                    .push(ImportStatement::plain(module, alias, line));
            }
        }
    }

    /// `from [.]m import a, b as c` or `from m import *`.
    fn import_from(&mut self, node: Node<'_>) {
        let line = line(node);
        let Some(source) = node.child_by_field_name("module_name") else {
            return;
        };
        let (module, level) = if source.kind() == "relative_import" {
            let mut module = String::new();
            let mut level = 0;
            let mut cursor = source.walk();
            for part in source.named_children(&mut cursor) {
                match part.kind() {
                    "import_prefix" => level = self.text(part).matches('.').count() as u32,
                    "dotted_name" => module = self.dotted(part),
                    _ => {}
                }
            }
            (module, level)
        } else {
            (self.dotted(source), 0)
        };
        if level == 0 && module == "__future__" {
            return;
        }

        let mut cursor = node.walk();
        let is_star = node
            .named_children(&mut cursor)
            .any(|c| c.kind() == "wildcard_import");
        if is_star {
            self.facts
                .module
                .imports
                .push(ImportStatement::star(module, level, line));
            return;
        }

        let mut cursor = node.walk();
        let names: Vec<ImportedName> = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| {
                let (name, alias) = self.name_and_alias(n);
                ImportedName { name, alias }
            })
            .filter(|n| !n.name.is_empty())
            .collect();
        self.facts
            .module
            .imports
            .push(ImportStatement::from_import(module, level, names, line));
    }

    fn name_and_alias(&self, node: Node<'_>) -> (String, Option<String>) {
        if node.kind() == "aliased_import" {
            let name = node
                .child_by_field_name("name")
                .map(|n| self.dotted(n))
                .unwrap_or_default();
            let alias = node
                .child_by_field_name("alias")
                .map(|a| self.text(a).to_string());
            (name, alias)
        } else {
            (self.dotted(node), None)
        }
    }

    /// Dotted name with any inner whitespace removed.
    fn dotted(&self, node: Node<'_>) -> String {
        if node.kind() != "dotted_name" {
            return self.text(node).trim().to_string();
        }
        let mut cursor = node.walk();
        let parts: Vec<&str> = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "identifier")
            .map(|c| self.text(c))
            .collect();
        parts.join(".")
    }

    // ------------------------------------------------------------------------
    // Docstrings
    // ------------------------------------------------------------------------

    /// Docstring of a module or block: its first statement, if a bare string.
    fn docstring(&self, block: Node<'_>) -> Option<String> {
        let mut cursor = block.walk();
        let first = block
            .named_children(&mut cursor)
            .find(|c| c.kind() != "comment")?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let string = first.named_child(0).filter(|s| s.kind() == "string")?;
        Some(string_value(self.text(string)))
    }
}

fn line(node: Node<'_>) -> u32 {
    node.start_position().row as u32 + 1
}

/// Contents of a string literal without prefix and quotes, trimmed.
fn string_value(raw: &str) -> String {
    let body = raw.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = body
            .strip_prefix(quote)
            .and_then(|b| b.strip_suffix(quote))
        {
            return inner.trim().to_string();
        }
    }
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgraph_core::facts::ImportKind;

    fn extract(source: &str) -> ModuleFacts {
        let identity = ModuleIdentity {
            name: "m".to_string(),
            is_package: false,
        };
        extract_module(&identity, "m.py", source).unwrap()
    }

    fn class<'a>(facts: &'a ModuleFacts, id: &str) -> &'a ClassDecl {
        facts.classes.iter().find(|c| c.id == id).unwrap()
    }

    fn function<'a>(facts: &'a ModuleFacts, id: &str) -> &'a FunctionDecl {
        facts.functions.iter().find(|f| f.id == id).unwrap()
    }

    fn calls_of(facts: &ModuleFacts, caller: &str) -> Vec<String> {
        facts
            .calls
            .iter()
            .filter(|c| c.caller == caller)
            .map(|c| c.callee.raw.clone())
            .collect()
    }

    mod classes {
        use super::*;

        #[test]
        fn bases_as_written() {
            let facts = extract(
                "class A(Base, mixins.Logged, Generic[T], metaclass=Meta):\n    pass\n",
            );
            let a = class(&facts, "m.A");
            let bases: Vec<&str> = a.bases.iter().map(|b| b.raw.as_str()).collect();
            assert_eq!(bases, vec!["Base", "mixins.Logged", "Generic"]);
            assert!(a.bases.iter().all(|b| b.resolution.is_unresolved()));
            assert_eq!(a.line, 1);
        }

        #[test]
        fn methods_attributes_and_docstring() {
            let source = r#"
class Circle:
    """A round shape."""
    sides = 0
    radius: float = 1.0
    color: str

    def __init__(self, radius):
        self.radius = radius
        self._cache = None
        self.center: tuple = (0, 0)

    def area(self) -> float:
        return 3.14 * self.radius ** 2
"#;
            let facts = extract(source);
            let circle = class(&facts, "m.Circle");
            assert_eq!(circle.docstring.as_deref(), Some("A round shape."));
            assert_eq!(circle.methods, vec!["m.Circle.__init__", "m.Circle.area"]);
            let attrs: Vec<(&str, Option<&str>)> = circle
                .attributes
                .iter()
                .map(|a| (a.name.as_str(), a.annotation.as_deref()))
                .collect();
            assert_eq!(
                attrs,
                vec![
                    ("sides", None),
                    ("radius", Some("float")),
                    ("color", Some("str")),
                    ("_cache", None),
                    ("center", Some("tuple")),
                ]
            );
            assert!(circle.attributes[3].visibility.is_private());
            assert_eq!(facts.module.functions, Vec::<String>::new());
        }

        #[test]
        fn decorators_are_opaque() {
            let facts = extract("@dataclass(frozen=True)\nclass P:\n    x: int\n");
            assert_eq!(class(&facts, "m.P").decorators, vec!["dataclass(frozen=True)"]);
        }

        #[test]
        fn nested_classes_are_flattened() {
            let source = "class Outer:\n    class Inner:\n        def go(self):\n            pass\n";
            let facts = extract(source);
            let inner = class(&facts, "m.Outer.Inner");
            assert_eq!(inner.parent.as_deref(), Some("m.Outer"));
            assert_eq!(inner.methods, vec!["m.Outer.Inner.go"]);
            assert_eq!(facts.module.classes, vec!["m.Outer", "m.Outer.Inner"]);
        }

        #[test]
        fn definitions_inside_compound_statements() {
            let source = r#"
try:
    import fast
except ImportError:
    class Fallback:
        pass

if True:
    def helper():
        pass
"#;
            let facts = extract(source);
            assert_eq!(facts.module.classes, vec!["m.Fallback"]);
            assert_eq!(facts.module.functions, vec!["m.helper"]);
            assert_eq!(facts.module.imports[0].module, "fast");
        }
    }

    mod functions {
        use super::*;

        #[test]
        fn parameters_and_returns() {
            let source =
                "async def fetch(url: str, retries=3, *args, timeout: float = 1.0, **kw) -> bytes:\n    pass\n";
            let facts = extract(source);
            let f = function(&facts, "m.fetch");
            assert!(f.is_async);
            assert_eq!(f.returns.as_deref(), Some("bytes"));
            let params: Vec<(&str, ParamKind, bool)> = f
                .params
                .iter()
                .map(|p| (p.name.as_str(), p.kind, p.has_default))
                .collect();
            assert_eq!(
                params,
                vec![
                    ("url", ParamKind::Positional, false),
                    ("retries", ParamKind::Positional, true),
                    ("args", ParamKind::VarPositional, false),
                    ("timeout", ParamKind::KeywordOnly, true),
                    ("kw", ParamKind::VarKeyword, false),
                ]
            );
            assert_eq!(f.params[0].annotation.as_deref(), Some("str"));
            assert_eq!(f.params[3].annotation.as_deref(), Some("float"));
        }

        #[test]
        fn bare_star_makes_keyword_only() {
            let facts = extract("def f(a, *, b):\n    pass\n");
            let f = function(&facts, "m.f");
            assert_eq!(f.params.len(), 2);
            assert_eq!(f.params[1].kind, ParamKind::KeywordOnly);
        }

        #[test]
        fn nested_functions_record_parent() {
            let source = r#"
def outer():
    def inner():
        return 1
    return inner()

class C:
    def method(self):
        def helper():
            pass
        helper()
"#;
            let facts = extract(source);
            let inner = function(&facts, "m.outer.inner");
            assert_eq!(inner.parent.as_deref(), Some("m.outer"));
            assert!(!inner.is_method());
            let helper = function(&facts, "m.C.method.helper");
            assert_eq!(helper.parent.as_deref(), Some("m.C.method"));
            assert!(function(&facts, "m.C.method").is_method());
            assert_eq!(
                facts.module.functions,
                vec!["m.outer", "m.outer.inner", "m.C.method.helper"]
            );
        }

        #[test]
        fn docstring_and_decorators() {
            let source = "@staticmethod\n@cache\ndef f():\n    '''Does f.'''\n";
            let facts = extract(source);
            let f = function(&facts, "m.f");
            assert_eq!(f.decorators, vec!["staticmethod", "cache"]);
            assert_eq!(f.docstring.as_deref(), Some("Does f."));
            assert_eq!(f.line, 3);
        }
    }

    mod imports {
        use super::*;

        #[test]
        fn plain_imports_one_per_name() {
            let facts = extract("import os, a.b as ab\n");
            let imports = &facts.module.imports;
            assert_eq!(imports.len(), 2);
            assert_eq!(imports[0].kind, ImportKind::Import);
            assert_eq!(imports[0].module, "os");
            assert_eq!(imports[1].module, "a.b");
            assert_eq!(imports[1].alias.as_deref(), Some("ab"));
        }

        #[test]
        fn from_imports() {
            let source = "from pkg.mod import A, B as C\nfrom .. import sib\nfrom .util import *\n";
            let facts = extract(source);
            let imports = &facts.module.imports;
            assert_eq!(imports[0].module, "pkg.mod");
            assert_eq!(imports[0].level, 0);
            assert_eq!(imports[0].names[1].bound_name(), "C");
            assert_eq!(imports[1].module, "");
            assert_eq!(imports[1].level, 2);
            assert_eq!(imports[1].names[0].name, "sib");
            assert!(imports[2].is_star);
            assert_eq!(imports[2].dotted_module(), ".util");
        }

        #[test]
        fn future_imports_are_ignored() {
            let facts = extract("from __future__ import annotations\nimport sys\n");
            assert_eq!(facts.module.imports.len(), 1);
            assert_eq!(facts.module.imports[0].module, "sys");
        }

        #[test]
        fn imports_inside_functions_count() {
            let facts = extract("def f():\n    import json\n    return json.dumps({})\n");
            assert_eq!(facts.module.imports[0].module, "json");
            assert_eq!(facts.module.imports[0].line, 2);
        }

        #[test]
        fn module_docstring() {
            let facts = extract("# header\n\"\"\"Module doc.\"\"\"\nimport os\n");
            assert_eq!(facts.module.docstring.as_deref(), Some("Module doc."));
        }
    }

    mod calls {
        use super::*;

        #[test]
        fn callee_text_as_written() {
            let source = r#"
def run(items):
    setup()
    obj.method(1)
    a.b.c(x=helper())
    values = [convert(i) for i in items]
    key = lambda v: score(v)
    return factory()()
"#;
            let facts = extract(source);
            let calls = calls_of(&facts, "m.run");
            assert_eq!(
                calls,
                vec![
                    "setup",
                    "obj.method",
                    "a.b.c",
                    "helper",
                    "convert",
                    "score",
                    "factory()",
                    "factory"
                ]
            );
            assert_eq!(facts.calls[0].line, 3);
        }

        #[test]
        fn nested_definitions_own_their_calls() {
            let source = r#"
def outer():
    first()
    def inner():
        second()
    inner()
"#;
            let facts = extract(source);
            assert_eq!(calls_of(&facts, "m.outer"), vec!["first", "inner"]);
            assert_eq!(calls_of(&facts, "m.outer.inner"), vec!["second"]);
        }

        #[test]
        fn module_level_calls_are_not_recorded() {
            let facts = extract("main()\nclass C:\n    x = compute()\n");
            assert!(facts.calls.is_empty());
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn syntax_error_has_position() {
            let identity = ModuleIdentity {
                name: "bad".to_string(),
                is_package: false,
            };
            let err = extract_module(&identity, "bad.py", "def ok():\n    pass\n\ndef broken(:\n").unwrap_err();
            match err {
                ExtractError::Syntax { line, .. } => assert_eq!(line, 4),
                other => panic!("unexpected: {other:?}"),
            }
            assert!(!err_is_fatal("def broken(:\n"));
        }

        fn err_is_fatal(source: &str) -> bool {
            let identity = ModuleIdentity {
                name: "bad".to_string(),
                is_package: false,
            };
            extract_module(&identity, "bad.py", source)
                .unwrap_err()
                .is_fatal()
        }

        #[test]
        fn empty_file_is_valid() {
            let facts = extract("");
            assert!(facts.classes.is_empty());
            assert!(facts.module.docstring.is_none());
        }

        #[test]
        fn string_values() {
            assert_eq!(string_value("r'''raw'''"), "raw");
            assert_eq!(string_value("\"x\""), "x");
            assert_eq!(string_value("'''  padded\n  '''"), "padded");
        }
    }
}
