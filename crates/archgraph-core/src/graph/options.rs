//! The option bag shared by all graph builders.

use serde::{Deserialize, Serialize};

use super::GraphError;

/// Options controlling one graph derivation.
///
/// Not every builder reads every field; unused ones are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphOptions {
    /// Keep `_private` classes, functions and members.
    pub include_private: bool,
    /// List methods on class nodes (and under classes in the package tree).
    pub include_methods: bool,
    /// List attributes on class nodes.
    pub include_attributes: bool,
    /// Maximum builder-specific depth; `None` means unlimited.
    pub max_depth: Option<i64>,
    /// Show external bases and packages as placeholder nodes.
    pub include_external: bool,
    /// Collapse modules into their package (dependency graph).
    pub group_by_package: bool,
    /// Restrict the call graph to one module and its direct neighbors.
    pub focus_module: Option<String>,
    /// Keep packages with no modules (package tree).
    pub show_empty: bool,
    /// Show classes and functions as leaves (package tree).
    pub include_members: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        GraphOptions {
            include_private: false,
            include_methods: true,
            include_attributes: true,
            max_depth: None,
            include_external: false,
            group_by_package: false,
            focus_module: None,
            show_empty: false,
            include_members: false,
        }
    }
}

impl GraphOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_private(mut self, include: bool) -> Self {
        self.include_private = include;
        self
    }

    pub fn with_methods(mut self, include: bool) -> Self {
        self.include_methods = include;
        self
    }

    pub fn with_attributes(mut self, include: bool) -> Self {
        self.include_attributes = include;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<i64>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_external(mut self, include: bool) -> Self {
        self.include_external = include;
        self
    }

    pub fn with_group_by_package(mut self, group: bool) -> Self {
        self.group_by_package = group;
        self
    }

    pub fn with_focus_module(mut self, module: Option<String>) -> Self {
        self.focus_module = module;
        self
    }

    pub fn with_show_empty(mut self, show: bool) -> Self {
        self.show_empty = show;
        self
    }

    pub fn with_members(mut self, include: bool) -> Self {
        self.include_members = include;
        self
    }

    /// Reject malformed values.
    pub fn validate(&self) -> Result<(), GraphError> {
        if let Some(depth) = self.max_depth {
            if depth < 0 {
                return Err(GraphError::InvalidOption {
                    option: "max_depth".to_string(),
                    reason: format!("must not be negative, got {}", depth),
                });
            }
        }
        if let Some(focus) = &self.focus_module {
            if focus.trim().is_empty() {
                return Err(GraphError::InvalidOption {
                    option: "focus_module".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// The depth limit as a count, after validation.
    pub fn depth_limit(&self) -> Result<Option<usize>, GraphError> {
        self.validate()?;
        Ok(self
            .max_depth
            .map(|d| usize::try_from(d).unwrap_or(usize::MAX)))
    }
}
