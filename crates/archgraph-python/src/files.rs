//! Module naming for Python files.
//!
//! Maps root-relative paths to qualified module names the way the import
//! system would see them with the analyzed root on `sys.path`.

use archgraph_core::workspace::ModuleIdentity;

/// Module name of the top-level script namespace.
pub const MAIN_MODULE: &str = "__main__";

/// Module identity of a root-relative `.py` path.
///
/// - `pkg/sub/mod.py` is `pkg.sub.mod`
/// - `pkg/__init__.py` is the package `pkg`
/// - a root-level `__init__.py` is `__main__`
///
/// Returns `None` for non-Python files and for paths with a segment that is
/// not a valid identifier (`my-scripts/run.py`, `setup.cfg.py`), since no
/// import statement can name them.
pub fn module_identity_for_path(relative_path: &str) -> Option<ModuleIdentity> {
    let stem = relative_path.strip_suffix(".py")?;
    let mut segments: Vec<&str> = stem.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() || !segments.iter().all(|s| is_identifier(s)) {
        tracing::debug!(path = relative_path, "path is not importable");
        return None;
    }

    let is_package = segments.last() == Some(&"__init__");
    if is_package {
        segments.pop();
        if segments.is_empty() {
            return Some(ModuleIdentity {
                name: MAIN_MODULE.to_string(),
                is_package: false,
            });
        }
    }

    Some(ModuleIdentity {
        name: segments.join("."),
        is_package,
    })
}

/// Whether `s` is a valid Python identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(path: &str) -> Option<(String, bool)> {
        module_identity_for_path(path).map(|m| (m.name, m.is_package))
    }

    #[test]
    fn plain_modules() {
        assert_eq!(name("a.py"), Some(("a".to_string(), false)));
        assert_eq!(name("pkg/sub/mod.py"), Some(("pkg.sub.mod".to_string(), false)));
    }

    #[test]
    fn package_initializers() {
        assert_eq!(name("pkg/__init__.py"), Some(("pkg".to_string(), true)));
        assert_eq!(name("a/b/__init__.py"), Some(("a.b".to_string(), true)));
        assert_eq!(name("__init__.py"), Some(("__main__".to_string(), false)));
    }

    #[test]
    fn unnameable_paths_are_skipped() {
        assert_eq!(name("my-scripts/run.py"), None);
        assert_eq!(name("setup.cfg.py"), None);
        assert_eq!(name("2fast.py"), None);
        assert_eq!(name("README.md"), None);
        assert_eq!(name("pkg/mod.pyi"), None);
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("_private"));
        assert!(is_identifier("données"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a b"));
    }
}
