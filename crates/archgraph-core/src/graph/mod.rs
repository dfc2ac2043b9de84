//! Directed graphs derived from a [`StructuralModel`].
//!
//! Four builders share the [`GraphBuilder`] interface and are selected by
//! [`GraphKind`]:
//!
//! | Kind | Nodes | Edges |
//! |------|-------|-------|
//! | `class-hierarchy` | classes (+ external placeholders) | child → parent |
//! | `dependency` | modules or packages (+ external packages) | importer → imported |
//! | `call-graph` | functions and methods | caller → callee |
//! | `package-tree` | packages, modules (+ members) | parent → child |
//!
//! Builders are pure functions of model and options. Every graph they return
//! satisfies the no-dangling-edge invariant: [`DirectedGraph::add_edge`]
//! refuses edges whose endpoints are not nodes, and
//! [`DirectedGraph::retain_nodes`] drops the edges of removed nodes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::facts::StructuralModel;

mod call;
mod dependency;
mod filter;
mod hierarchy;
mod options;
mod package_tree;

pub use call::CallGraphBuilder;
pub use dependency::DependencyGraphBuilder;
pub use hierarchy::ClassHierarchyBuilder;
pub use options::GraphOptions;
pub use package_tree::PackageTreeBuilder;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An option value is malformed. Fatal to the one build call only.
    #[error("invalid option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },
}

// ============================================================================
// Graph kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraphKind {
    ClassHierarchy,
    Dependency,
    CallGraph,
    PackageTree,
}

impl GraphKind {
    pub const ALL: [GraphKind; 4] = [
        GraphKind::ClassHierarchy,
        GraphKind::Dependency,
        GraphKind::CallGraph,
        GraphKind::PackageTree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GraphKind::ClassHierarchy => "class-hierarchy",
            GraphKind::Dependency => "dependency",
            GraphKind::CallGraph => "call-graph",
            GraphKind::PackageTree => "package-tree",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GraphKind::ClassHierarchy => "classes and their inheritance relations",
            GraphKind::Dependency => "module import dependencies",
            GraphKind::CallGraph => "resolved calls between functions and methods",
            GraphKind::PackageTree => "package and module containment",
        }
    }

    /// The builder for this kind.
    pub fn builder(self) -> &'static dyn GraphBuilder {
        match self {
            GraphKind::ClassHierarchy => &ClassHierarchyBuilder,
            GraphKind::Dependency => &DependencyGraphBuilder,
            GraphKind::CallGraph => &CallGraphBuilder,
            GraphKind::PackageTree => &PackageTreeBuilder,
        }
    }

    /// Build this kind of graph.
    pub fn build(
        self,
        model: &StructuralModel,
        options: &GraphOptions,
    ) -> Result<DirectedGraph, GraphError> {
        self.builder().build(model, options)
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives one graph shape from a structural model.
pub trait GraphBuilder: Sync {
    fn kind(&self) -> GraphKind;

    /// Build the graph. Fails only for malformed options; an empty model
    /// yields an empty graph.
    fn build(
        &self,
        model: &StructuralModel,
        options: &GraphOptions,
    ) -> Result<DirectedGraph, GraphError>;
}

// ============================================================================
// Nodes and edges
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Package,
    Module,
    Class,
    Function,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Method,
    Attribute,
}

/// A member listed inside a class node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    /// Method signature or attribute annotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    /// Placeholder for something outside the analyzed tree.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
    /// Owning module, where one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Builder-specific distance used by the depth filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Node {
            id: id.into(),
            label: label.into(),
            kind,
            external: false,
            module: None,
            depth: None,
            members: Vec::new(),
        }
    }

    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Inherits,
    Imports,
    Calls,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    /// Number of model relations collapsed into this edge.
    pub weight: u32,
}

// ============================================================================
// DirectedGraph
// ============================================================================

type EdgeKey = (String, String, EdgeKind);

/// A directed graph of typed nodes and edges, ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectedGraph {
    kind: GraphKind,
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<EdgeKey, Edge>,
}

impl DirectedGraph {
    pub fn new(kind: GraphKind) -> Self {
        DirectedGraph {
            kind,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Add a node. The first node under an id wins; returns whether this one
    /// was inserted.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Add an edge, or bump the weight of an existing one. Returns `false`
    /// without changing anything if either endpoint is missing.
    pub fn add_edge(&mut self, source: &str, target: &str, kind: EdgeKind) -> bool {
        if !self.nodes.contains_key(source) || !self.nodes.contains_key(target) {
            return false;
        }
        self.edges
            .entry((source.to_string(), target.to_string(), kind))
            .and_modify(|e| e.weight += 1)
            .or_insert_with(|| Edge {
                source: source.to_string(),
                target: target.to_string(),
                kind,
                weight: 1,
            });
        true
    }

    /// Keep only the nodes matching `keep`, and the edges between them.
    pub fn retain_nodes<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Node) -> bool,
    {
        self.nodes.retain(|_, node| keep(node));
        let nodes = &self.nodes;
        self.edges
            .retain(|(source, target, _), _| nodes.contains_key(source) && nodes.contains_key(target));
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn has_edge(&self, source: &str, target: &str, kind: EdgeKind) -> bool {
        self.edges
            .contains_key(&(source.to_string(), target.to_string(), kind))
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in (source, target, kind) order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_ids(&self) -> BTreeSet<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Serialize)]
struct GraphRepr<'a> {
    kind: GraphKind,
    nodes: Vec<&'a Node>,
    edges: Vec<&'a Edge>,
}

impl Serialize for DirectedGraph {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GraphRepr {
            kind: self.kind,
            nodes: self.nodes.values().collect(),
            edges: self.edges.values().collect(),
        }
        .serialize(serializer)
    }
}

// ============================================================================
// Tests
// ============================================================================
