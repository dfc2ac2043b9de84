//! Symbol resolver: classifies every raw reference in a model.
//!
//! One whole-model pass over the tables built by [`crate::facts::ModelBuilder`]:
//!
//! 1. Import targets: relative imports are made absolute against the
//!    importing module's package, then matched to the longest known module
//!    prefix. Unmatched names are external, named by their first segment.
//! 2. Base classes: looked up in the enclosing scopes, then through the
//!    module's import aliases, then through star imports. A bare name that
//!    nothing binds falls back to the one class in the model with that
//!    simple name, if there is exactly one.
//! 3. Calls: plain names and attribute chains rooted at a module-local or
//!    imported symbol. Anything rooted at a local variable (`self` included)
//!    stays unresolved.
//!
//! Every classification is recomputed from raw text, so running the pass on
//! an already resolved model changes nothing.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::facts::{
    ImportEdge, ImportKind, ImportStatement, InheritsEdge, Module, Reference, Resolution,
    StructuralModel,
};

/// Maximum number of re-export hops followed for one reference.
const MAX_REEXPORT_HOPS: usize = 8;

/// Resolve every import, base class and call in `model` in place.
pub fn resolve(model: &mut StructuralModel) {
    let _span = tracing::debug_span!("resolve", modules = model.module_count()).entered();

    let (imports, bases, calls) = {
        let index = Index::new(model);
        let imports = index.import_edges();
        let bases = index.class_bases();
        let calls: Vec<Resolution> = model
            .calls
            .iter()
            .map(|c| index.resolve_call(&c.caller, &c.callee.raw, &bases))
            .collect();
        (imports, bases, calls)
    };

    let mut inherits = Vec::new();
    for (class_id, resolutions) in bases {
        if let Some(class) = model.classes.get_mut(&class_id) {
            for (base, resolution) in class.bases.iter_mut().zip(resolutions) {
                base.resolution = resolution;
                inherits.push(InheritsEdge {
                    child: class_id.clone(),
                    parent: base.clone(),
                });
            }
        }
    }
    for (call, resolution) in model.calls.iter_mut().zip(calls) {
        call.callee.resolution = resolution;
    }
    model.calls.sort_by(|a, b| {
        (&a.caller, a.line, &a.callee.raw).cmp(&(&b.caller, b.line, &b.callee.raw))
    });
    model.imports = imports;
    model.inherits = inherits;

    tracing::info!(
        imports = model.imports.len(),
        bases = model.inherits.len(),
        calls = model.calls.len(),
        "resolution complete"
    );
}

/// A local name bound by an import.
#[derive(Debug, Clone)]
struct Binding {
    /// Absolute dotted target, or `None` for a relative import that climbs
    /// out of the tree.
    target: Option<String>,
}

/// What a symbol lookup should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Want {
    Class,
    /// A function; classes resolve to their `__init__`.
    Callable,
}

/// Read-only lookup structures over the model.
struct Index<'a> {
    model: &'a StructuralModel,
    /// First segments of every module name.
    roots: BTreeSet<&'a str>,
    aliases: BTreeMap<&'a str, BTreeMap<String, Binding>>,
    stars: BTreeMap<&'a str, Vec<String>>,
    /// Class ids by simple name.
    class_names: BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'a> Index<'a> {
    fn new(model: &'a StructuralModel) -> Self {
        let roots = model
            .modules
            .keys()
            .map(|name| name.split('.').next().unwrap_or(name))
            .collect();

        let mut aliases = BTreeMap::new();
        let mut stars = BTreeMap::new();
        for module in model.modules.values() {
            let (bindings, star_modules) = bindings_for(module);
            aliases.insert(module.name.as_str(), bindings);
            stars.insert(module.name.as_str(), star_modules);
        }

        let mut class_names: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for class in model.classes.values() {
            class_names
                .entry(class.name.as_str())
                .or_default()
                .push(class.id.as_str());
        }

        Index {
            model,
            roots,
            aliases,
            stars,
            class_names,
        }
    }

    // ------------------------------------------------------------------------
    // Imports
    // ------------------------------------------------------------------------

    fn import_edges(&self) -> Vec<ImportEdge> {
        let mut edges = Vec::new();
        for module in self.model.modules.values() {
            for stmt in &module.imports {
                let base = absolute_module(module, stmt);
                let raws = stmt.raw_targets();
                let targets: Vec<Option<String>> = match (&base, stmt.kind) {
                    (None, _) => vec![None; raws.len()],
                    (Some(base), ImportKind::Import) => vec![Some(base.clone())],
                    (Some(base), ImportKind::From) if stmt.is_star || stmt.names.is_empty() => {
                        vec![Some(base.clone())]
                    }
                    (Some(base), ImportKind::From) => stmt
                        .names
                        .iter()
                        .map(|n| Some(join(base, &n.name)))
                        .collect(),
                };
                for (raw, target) in raws.into_iter().zip(targets) {
                    let resolution = match target {
                        Some(target) => self.resolve_module(&target),
                        None => Resolution::Unresolved,
                    };
                    edges.push(ImportEdge {
                        importer: module.name.clone(),
                        target: Reference { raw, resolution },
                        line: stmt.line,
                    });
                }
            }
        }
        edges.sort_by(|a, b| {
            (&a.importer, a.line, &a.target.raw).cmp(&(&b.importer, b.line, &b.target.raw))
        });
        edges
    }

    /// Longest module prefix of an absolute dotted name.
    fn longest_module(&self, dotted: &str) -> Option<&'a str> {
        let mut candidate = dotted;
        loop {
            if let Some((name, _)) = self.model.modules.get_key_value(candidate) {
                return Some(name.as_str());
            }
            candidate = candidate.rsplit_once('.')?.0;
        }
    }

    fn resolve_module(&self, dotted: &str) -> Resolution {
        if let Some(module) = self.longest_module(dotted) {
            return Resolution::internal(module);
        }
        let root = dotted.split('.').next().unwrap_or_default();
        if root.is_empty() || self.roots.contains(root) {
            // Inside the tree (e.g. a namespace directory) but no such module.
            Resolution::Unresolved
        } else {
            Resolution::external(root)
        }
    }

    // ------------------------------------------------------------------------
    // Symbols
    // ------------------------------------------------------------------------

    /// Find a class or function id for an absolute dotted candidate, following
    /// re-exports through intermediate modules.
    fn lookup(&self, candidate: &str, want: Want, bases: &BaseMap) -> Option<String> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([(candidate.to_string(), 0usize)]);

        while let Some((candidate, hops)) = queue.pop_front() {
            if !visited.insert(candidate.clone()) {
                continue;
            }
            if let Some(found) = self.direct(&candidate, want, bases) {
                return Some(found);
            }
            if hops >= MAX_REEXPORT_HOPS {
                continue;
            }
            let Some(module) = self.longest_module(&candidate) else {
                continue;
            };
            let Some(rest) = candidate[module.len()..].strip_prefix('.') else {
                continue;
            };
            let (head, tail) = split_head(rest);
            if let Some(Binding {
                target: Some(target),
            }) = self.aliases.get(module).and_then(|a| a.get(head))
            {
                queue.push_back((join_opt(target, tail), hops + 1));
            }
            for star in self.stars.get(module).into_iter().flatten() {
                queue.push_back((join(star, rest), hops + 1));
            }
        }
        None
    }

    fn direct(&self, candidate: &str, want: Want, bases: &BaseMap) -> Option<String> {
        match want {
            Want::Class => self
                .model
                .classes
                .contains_key(candidate)
                .then(|| candidate.to_string()),
            Want::Callable => {
                if self.model.functions.contains_key(candidate) {
                    Some(candidate.to_string())
                } else if self.model.classes.contains_key(candidate) {
                    self.find_init(candidate, bases)
                } else {
                    None
                }
            }
        }
    }

    /// `__init__` of a class or of its nearest internal base.
    fn find_init(&self, class_id: &str, bases: &BaseMap) -> Option<String> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([class_id.to_string()]);
        while let Some(class) = queue.pop_front() {
            if !visited.insert(class.clone()) {
                continue;
            }
            let init = format!("{}.__init__", class);
            if self.model.functions.contains_key(&init) {
                return Some(init);
            }
            for base in bases.get(&class).into_iter().flatten() {
                if let Some(id) = base.internal_id() {
                    queue.push_back(id.to_string());
                }
            }
        }
        None
    }

    /// Resolve `raw` as seen from `scopes` (innermost first) in `module`.
    fn resolve_symbol(
        &self,
        module: &str,
        scopes: &[String],
        raw: &str,
        want: Want,
        bases: &BaseMap,
    ) -> Resolution {
        if !is_dotted_name(raw) {
            return Resolution::Unresolved;
        }
        let (head, _) = split_head(raw);

        for scope in scopes {
            let bound = join(scope, head);
            if self.model.classes.contains_key(&bound) || self.model.functions.contains_key(&bound)
            {
                return match self.direct(&join(scope, raw), want, bases) {
                    Some(id) => Resolution::internal(id),
                    None => Resolution::Unresolved,
                };
            }
        }

        if let Some(binding) = self.aliases.get(module).and_then(|a| a.get(head)) {
            let Some(target) = &binding.target else {
                return Resolution::Unresolved;
            };
            let candidate = join_opt(target, split_head(raw).1);
            if let Some(id) = self.lookup(&candidate, want, bases) {
                return Resolution::internal(id);
            }
            return match self.resolve_module(target) {
                Resolution::External { package } => Resolution::External { package },
                _ => Resolution::Unresolved,
            };
        }

        for star in self.stars.get(module).into_iter().flatten() {
            if let Some(id) = self.lookup(&join(star, raw), want, bases) {
                return Resolution::internal(id);
            }
        }

        Resolution::Unresolved
    }

    fn class_bases(&self) -> BaseMap {
        let empty = BaseMap::new();
        self.model
            .classes
            .values()
            .map(|class| {
                let scopes = self.scopes(&class.id, &class.module);
                let resolutions = class
                    .bases
                    .iter()
                    .map(|b| {
                        let resolution =
                            self.resolve_symbol(&class.module, &scopes, &b.raw, Want::Class, &empty);
                        if !resolution.is_unresolved() || self.is_bound(&class.module, &scopes, &b.raw) {
                            return resolution;
                        }
                        match self.unique_class_named(&b.raw, &class.id) {
                            Some(id) => Resolution::internal(id),
                            None => resolution,
                        }
                    })
                    .collect();
                (class.id.clone(), resolutions)
            })
            .collect()
    }

    /// Whether the head of `raw` is bound in a scope or by an import.
    fn is_bound(&self, module: &str, scopes: &[String], raw: &str) -> bool {
        let (head, _) = split_head(raw);
        let in_scope = scopes.iter().any(|scope| {
            let bound = join(scope, head);
            self.model.classes.contains_key(&bound) || self.model.functions.contains_key(&bound)
        });
        in_scope || self.aliases.get(module).is_some_and(|a| a.contains_key(head))
    }

    /// The only class other than `exclude` whose simple name is `name`.
    ///
    /// Used for bare base names nothing in the module binds, as when a file
    /// relies on names the runtime puts in scope some other way.
    fn unique_class_named(&self, name: &str, exclude: &str) -> Option<String> {
        if name.contains('.') || !is_dotted_name(name) {
            return None;
        }
        let mut found = self
            .class_names
            .get(name)?
            .iter()
            .filter(|id| **id != exclude);
        let id = found.next()?;
        if found.next().is_some() {
            return None;
        }
        Some(id.to_string())
    }

    fn resolve_call(&self, caller: &str, raw: &str, bases: &BaseMap) -> Resolution {
        let Some(function) = self.model.functions.get(caller) else {
            return Resolution::Unresolved;
        };
        let (head, _) = split_head(raw);
        if head == "self" || head == "cls" {
            return Resolution::Unresolved;
        }
        let mut scopes = vec![function.id.clone()];
        scopes.extend(self.scopes(&function.id, &function.module));
        self.resolve_symbol(&function.module, &scopes, raw, Want::Callable, bases)
    }

    /// Scopes visible from inside `id`, innermost first: enclosing functions,
    /// then the module. Class bodies are not enclosing scopes.
    fn scopes(&self, id: &str, module: &str) -> Vec<String> {
        let mut scopes = Vec::new();
        let mut current = id;
        while let Some((prefix, _)) = current.rsplit_once('.') {
            if prefix.len() <= module.len() {
                break;
            }
            if self.model.functions.contains_key(prefix) {
                scopes.push(prefix.to_string());
            }
            current = prefix;
        }
        scopes.push(module.to_string());
        scopes
    }
}

/// Base resolutions per class id, in declaration order.
type BaseMap = BTreeMap<String, Vec<Resolution>>;

/// Import bindings and star-imported modules of one module.
fn bindings_for(module: &Module) -> (BTreeMap<String, Binding>, Vec<String>) {
    let mut bindings = BTreeMap::new();
    let mut stars = Vec::new();
    for stmt in &module.imports {
        match stmt.kind {
            ImportKind::Import => {
                let (name, target) = match &stmt.alias {
                    Some(alias) => (alias.clone(), stmt.module.clone()),
                    None => {
                        let root = split_head(&stmt.module).0.to_string();
                        (root.clone(), root)
                    }
                };
                bindings.insert(
                    name,
                    Binding {
                        target: Some(target),
                    },
                );
            }
            ImportKind::From => {
                let base = absolute_module(module, stmt);
                if stmt.is_star {
                    stars.extend(base);
                    continue;
                }
                for name in &stmt.names {
                    bindings.insert(
                        name.bound_name().to_string(),
                        Binding {
                            target: base.as_deref().map(|b| join(b, &name.name)),
                        },
                    );
                }
            }
        }
    }
    (bindings, stars)
}

/// The absolute module a statement imports from. `None` when a relative
/// import climbs above the top-level package.
pub(crate) fn absolute_module(module: &Module, stmt: &ImportStatement) -> Option<String> {
    if stmt.level == 0 {
        return Some(stmt.module.clone());
    }
    let mut package = module.package()?;
    for _ in 1..stmt.level {
        package = package.rsplit_once('.')?.0;
    }
    Some(join(package, &stmt.module))
}

fn is_dotted_name(raw: &str) -> bool {
    !raw.is_empty()
        && raw.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c == '_' || c.is_alphabetic())
                && chars.all(|c| c == '_' || c.is_alphanumeric())
        })
}

fn split_head(dotted: &str) -> (&str, Option<&str>) {
    match dotted.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (dotted, None),
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn join_opt(prefix: &str, rest: Option<&str>) -> String {
    join(prefix, rest.unwrap_or_default())
}

// ============================================================================
// Tests
// ============================================================================
