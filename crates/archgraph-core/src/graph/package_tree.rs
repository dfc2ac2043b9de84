//! Package-tree builder: strict containment of packages, modules and members.

use std::collections::BTreeMap;

use crate::facts::StructuralModel;

use super::filter::{apply_depths, is_private_module};
use super::{DirectedGraph, EdgeKind, GraphBuilder, GraphError, GraphKind, GraphOptions, Node, NodeKind};

/// Builds [`GraphKind::PackageTree`] graphs.
///
/// Every dotted prefix of a module name is a node, so namespace directories
/// without an `__init__.py` still appear as packages. Each node has exactly
/// one parent. A package whose `__init__.py` is the only module beneath it is
/// empty and only shown with `show_empty`. Private modules, and everything
/// beneath them, are hidden unless `include_private` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageTreeBuilder;

impl GraphBuilder for PackageTreeBuilder {
    fn kind(&self) -> GraphKind {
        GraphKind::PackageTree
    }

    fn build(
        &self,
        model: &StructuralModel,
        options: &GraphOptions,
    ) -> Result<DirectedGraph, GraphError> {
        let limit = options.depth_limit()?;
        let mut graph = DirectedGraph::new(GraphKind::PackageTree);
        let mut depths: BTreeMap<String, usize> = BTreeMap::new();

        for module in model.modules() {
            if !options.include_private && is_private_module(&module.name) {
                continue;
            }
            if module.is_package && !options.show_empty && !has_submodules(model, &module.name) {
                continue;
            }
            let mut parent: Option<String> = None;
            let segments: Vec<&str> = module.name.split('.').collect();
            for (depth, segment) in segments.iter().enumerate() {
                let id = segments[..=depth].join(".");
                let is_leaf = depth + 1 == segments.len();
                let kind = if is_leaf && !module.is_package {
                    NodeKind::Module
                } else {
                    NodeKind::Package
                };
                let mut node = Node::new(id.clone(), *segment, kind);
                if is_leaf {
                    node = node.with_module(module.name.clone());
                }
                graph.add_node(node);
                depths.entry(id.clone()).or_insert(depth);
                if let Some(parent) = &parent {
                    graph.add_edge(parent, &id, EdgeKind::Contains);
                }
                parent = Some(id);
            }

            if options.include_members {
                add_members(model, &mut graph, &mut depths, &module.name, options);
            }
        }

        apply_depths(&mut graph, &depths, limit);
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built package tree"
        );
        Ok(graph)
    }
}

fn has_submodules(model: &StructuralModel, package: &str) -> bool {
    let prefix = format!("{}.", package);
    model.modules().any(|m| m.name.starts_with(&prefix))
}

/// Classes and functions of a module as leaves, nested under their
/// enclosing class or function; methods only with `include_methods`.
fn add_members(
    model: &StructuralModel,
    graph: &mut DirectedGraph,
    depths: &mut BTreeMap<String, usize>,
    module_name: &str,
    options: &GraphOptions,
) {
    let Some(module) = model.module(module_name) else {
        return;
    };

    let mut members: Vec<(&str, NodeKind)> = Vec::new();
    for id in &module.classes {
        members.push((id, NodeKind::Class));
        if options.include_methods {
            if let Some(class) = model.class(id) {
                members.extend(class.methods.iter().map(|m| (m.as_str(), NodeKind::Method)));
            }
        }
    }
    members.extend(module.functions.iter().map(|f| (f.as_str(), NodeKind::Function)));
    // Parents sort before their children.
    members.sort();

    for (id, kind) in members {
        if !options.include_private && model.is_private_symbol(id) {
            continue;
        }
        let Some((parent, name)) = id.rsplit_once('.') else {
            continue;
        };
        let Some(parent_depth) = depths.get(parent).copied() else {
            continue;
        };
        if !graph.contains_node(parent) {
            continue;
        }
        let node = Node::new(id, name, kind).with_module(module_name);
        if graph.add_node(node) {
            graph.add_edge(parent, id, EdgeKind::Contains);
            depths.insert(id.to_string(), parent_depth + 1);
        }
    }
}
