//! Dependency-graph builder: module (or package) import edges.

use std::collections::BTreeMap;

use crate::facts::{Module, Resolution, StructuralModel};

use super::filter::{apply_depths, is_private_module};
use super::{DirectedGraph, EdgeKind, GraphBuilder, GraphError, GraphKind, GraphOptions, Node, NodeKind};

/// Builds [`GraphKind::Dependency`] graphs.
///
/// Depth is package nesting: `a` is 0, `a.b` is 1. External packages sit at
/// depth 0. Self-imports, including intra-package imports once modules are
/// grouped, never produce edges. Modules and packages with a private name
/// segment are hidden unless `include_private` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyGraphBuilder;

impl GraphBuilder for DependencyGraphBuilder {
    fn kind(&self) -> GraphKind {
        GraphKind::Dependency
    }

    fn build(
        &self,
        model: &StructuralModel,
        options: &GraphOptions,
    ) -> Result<DirectedGraph, GraphError> {
        let limit = options.depth_limit()?;
        let mut graph = DirectedGraph::new(GraphKind::Dependency);

        let hidden = |id: &str| !options.include_private && is_private_module(id);
        for module in model.modules() {
            let id = node_id(module, options.group_by_package);
            if hidden(id.as_str()) {
                continue;
            }
            let kind = if options.group_by_package || module.is_package {
                NodeKind::Package
            } else {
                NodeKind::Module
            };
            let label = id.clone();
            graph.add_node(Node::new(id, label, kind));
        }

        for edge in model.imports() {
            let Some(importer) = model.module(&edge.importer) else {
                continue;
            };
            let source = node_id(importer, options.group_by_package);
            let target = match &edge.target.resolution {
                Resolution::Internal { id } => match model.module(id) {
                    Some(module) => node_id(module, options.group_by_package),
                    None => continue,
                },
                Resolution::External { package } if options.include_external && !hidden(package.as_str()) => {
                    graph.add_node(
                        Node::new(package.clone(), package.clone(), NodeKind::Package).external(),
                    );
                    package.clone()
                }
                _ => continue,
            };
            if source != target {
                graph.add_edge(&source, &target, EdgeKind::Imports);
            }
        }

        let depths: BTreeMap<String, usize> = graph
            .nodes()
            .map(|n| {
                let depth = if n.external { 0 } else { nesting(&n.id) };
                (n.id.clone(), depth)
            })
            .collect();
        apply_depths(&mut graph, &depths, limit);
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built dependency graph"
        );
        Ok(graph)
    }
}

/// The node a module maps to: itself, or its immediate package when grouping.
fn node_id(module: &Module, group_by_package: bool) -> String {
    if !group_by_package {
        return module.name.clone();
    }
    module.package().unwrap_or(&module.name).to_string()
}

fn nesting(dotted: &str) -> usize {
    dotted.matches('.').count()
}
