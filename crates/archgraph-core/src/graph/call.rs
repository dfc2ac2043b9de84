//! Call-graph builder: functions and methods, caller → callee edges.

use std::collections::{BTreeMap, BTreeSet};

use crate::facts::{FunctionDecl, StructuralModel};

use super::filter::{apply_depths, depths};
use super::{DirectedGraph, EdgeKind, GraphBuilder, GraphError, GraphKind, GraphOptions, Node, NodeKind};

/// Builds [`GraphKind::CallGraph`] graphs.
///
/// Only internally resolved calls become edges. With private names hidden, a
/// call into a private function is followed through it: the caller gets an
/// edge to every visible function reached through hidden ones only. Calls
/// made by hidden functions that no visible function reaches are dropped, so
/// the filtered graph never has a node the unfiltered one lacks.
///
/// Depth is the number of call hops from an entry function (no incoming
/// calls) or, with a focus module, from that module's functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallGraphBuilder;

impl GraphBuilder for CallGraphBuilder {
    fn kind(&self) -> GraphKind {
        GraphKind::CallGraph
    }

    fn build(
        &self,
        model: &StructuralModel,
        options: &GraphOptions,
    ) -> Result<DirectedGraph, GraphError> {
        let limit = options.depth_limit()?;
        let mut graph = DirectedGraph::new(GraphKind::CallGraph);

        if let Some(focus) = &options.focus_module {
            if model.module(focus).is_none() {
                tracing::warn!(module = %focus, "focus module not found; call graph is empty");
                return Ok(graph);
            }
        }

        let visible = |id: &str| options.include_private || !model.is_private_symbol(id);
        for function in model.functions() {
            if visible(&function.id) {
                graph.add_node(function_node(function));
            }
        }

        let callees = resolved_callees(model);
        for call in model.calls() {
            let Some(callee) = call.callee.resolution.internal_id() else {
                continue;
            };
            if !graph.contains_node(&call.caller) || model.function(callee).is_none() {
                continue;
            }
            if visible(callee) {
                graph.add_edge(&call.caller, callee, EdgeKind::Calls);
                continue;
            }
            for target in reached_through_hidden(&callees, callee, &visible) {
                if target != call.caller {
                    graph.add_edge(&call.caller, target, EdgeKind::Calls);
                }
            }
        }

        let depths = match &options.focus_module {
            Some(focus) => focus_depths(&mut graph, focus),
            None => depths(&graph, EdgeKind::Calls, false),
        };
        apply_depths(&mut graph, &depths, limit);
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built call graph"
        );
        Ok(graph)
    }
}

/// Internal callees of every function that has any.
fn resolved_callees(model: &StructuralModel) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut callees: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for call in model.calls() {
        if let Some(callee) = call.callee.resolution.internal_id() {
            if model.function(callee).is_some() {
                callees.entry(call.caller.as_str()).or_default().insert(callee);
            }
        }
    }
    callees
}

/// Visible functions reachable from the hidden function `start` along paths
/// whose intermediate functions are all hidden.
fn reached_through_hidden<'a>(
    callees: &BTreeMap<&'a str, BTreeSet<&'a str>>,
    start: &'a str,
    visible: &impl Fn(&str) -> bool,
) -> BTreeSet<&'a str> {
    let mut reached = BTreeSet::new();
    let mut seen = BTreeSet::from([start]);
    let mut stack = vec![start];
    while let Some(hidden) = stack.pop() {
        for &next in callees.get(hidden).into_iter().flatten() {
            if visible(next) {
                reached.insert(next);
            } else if seen.insert(next) {
                stack.push(next);
            }
        }
    }
    reached
}

fn function_node(function: &FunctionDecl) -> Node {
    let kind = if function.is_method() {
        NodeKind::Method
    } else {
        NodeKind::Function
    };
    Node::new(function.id.clone(), local_label(&function.id, &function.module), kind)
        .with_module(function.module.clone())
}

/// Id below its module, e.g. `Circle.area` for `shapes.Circle.area`.
fn local_label(id: &str, module: &str) -> String {
    id.strip_prefix(module)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(id)
        .to_string()
}

/// Star-shaped reduction around a focus module: its nodes at depth 0, their
/// direct callers and callees at depth 1, everything else removed. Edges
/// between two non-focus neighbors are removed too.
fn focus_depths(graph: &mut DirectedGraph, focus: &str) -> BTreeMap<String, usize> {
    let centers: BTreeSet<String> = graph
        .nodes()
        .filter(|n| n.module.as_deref() == Some(focus))
        .map(|n| n.id.clone())
        .collect();

    let mut depths: BTreeMap<String, usize> =
        centers.iter().map(|id| (id.clone(), 0)).collect();
    let mut kept_edges = Vec::new();
    for edge in graph.edges() {
        let touches_source = centers.contains(&edge.source);
        let touches_target = centers.contains(&edge.target);
        if !touches_source && !touches_target {
            continue;
        }
        for id in [&edge.source, &edge.target] {
            depths.entry(id.clone()).or_insert(1);
        }
        kept_edges.push((edge.source.clone(), edge.target.clone(), edge.weight));
    }

    let mut reduced = DirectedGraph::new(GraphKind::CallGraph);
    for node in graph.nodes() {
        if depths.contains_key(&node.id) {
            reduced.add_node(node.clone());
        }
    }
    for (source, target, weight) in kept_edges {
        for _ in 0..weight {
            reduced.add_edge(&source, &target, EdgeKind::Calls);
        }
    }
    *graph = reduced;
    depths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{
        CallEdge, ClassDecl, FunctionDecl, ImportStatement, ImportedName, Module, ModelBuilder,
        ModuleFacts, Resolution,
    };

    fn add_function(f: &mut ModuleFacts, scope: &str, name: &str, class: Option<&str>) -> String {
        let m = f.module.name.clone();
        let mut func = FunctionDecl::new(&m, scope, name, 1);
        if let Some(class) = class {
            func = func.in_class(class);
            if let Some(c) = f.classes.iter_mut().find(|c| c.id == class) {
                c.methods.push(func.id.clone());
            }
        } else {
            f.module.functions.push(func.id.clone());
        }
        let id = func.id.clone();
        f.functions.push(func);
        id
    }

    /// `svc` calls into `core`, `core` has a private helper and a class with
    /// a private method, `other` calls `svc`.
    fn model() -> StructuralModel {
        let mut core = ModuleFacts::new(Module::new("core", "core.py", false));
        let class = ClassDecl::new("core", "core", "Engine", 1);
        core.module.classes.push(class.id.clone());
        core.classes.push(class);
        let start = add_function(&mut core, "core.Engine", "start", Some("core.Engine"));
        let spin = add_function(&mut core, "core.Engine", "_spin", Some("core.Engine"));
        let run = add_function(&mut core, "core", "run", None);
        let helper = add_function(&mut core, "core", "_helper", None);
        add_function(&mut core, "core", "leaf", None);
        core.calls.push(CallEdge::new(&start, "Engine._spin", 2));
        core.calls.push(CallEdge::new(&spin, "leaf", 3));
        core.calls.push(CallEdge::new(&run, "_helper", 4));
        core.calls.push(CallEdge::new(&helper, "leaf", 5));
        core.calls.push(CallEdge::new(&run, "self.dynamic", 6));

        let mut svc = ModuleFacts::new(Module::new("svc", "svc.py", false));
        svc.module.imports.push(ImportStatement::from_import(
            "core",
            0,
            vec![ImportedName {
                name: "run".into(),
                alias: None,
            }],
            1,
        ));
        let main = add_function(&mut svc, "svc", "main", None);
        svc.calls.push(CallEdge::new(&main, "run", 2));
        svc.calls.push(CallEdge::new(&main, "main", 3));

        let mut other = ModuleFacts::new(Module::new("other", "other.py", false));
        other
            .module
            .imports
            .push(ImportStatement::plain("svc", None, 1));
        let job = add_function(&mut other, "other", "job", None);
        other.calls.push(CallEdge::new(&job, "svc.main", 2));

        let mut builder = ModelBuilder::new();
        for f in [core, svc, other] {
            builder.add(f);
        }
        builder.finish().0
    }

    #[test]
    fn resolved_calls_with_private_names_shown() {
        let g = CallGraphBuilder
            .build(&model(), &GraphOptions::default().with_private(true))
            .unwrap();
        assert_eq!(g.node_count(), 7);
        assert!(g.has_edge("core.Engine.start", "core.Engine._spin", EdgeKind::Calls));
        assert!(g.has_edge("core.run", "core._helper", EdgeKind::Calls));
        assert!(g.has_edge("svc.main", "core.run", EdgeKind::Calls));
        assert!(g.has_edge("svc.main", "svc.main", EdgeKind::Calls));
        assert_eq!(g.node("core.Engine.start").unwrap().kind, NodeKind::Method);
        assert_eq!(g.node("core.Engine.start").unwrap().label, "Engine.start");
    }

    #[test]
    fn unresolved_calls_stay_in_model_only() {
        let model = model();
        let dynamic = model
            .calls()
            .iter()
            .find(|c| c.callee.raw == "self.dynamic")
            .unwrap();
        assert_eq!(dynamic.callee.resolution, Resolution::Unresolved);
        let g = CallGraphBuilder
            .build(&model, &GraphOptions::default())
            .unwrap();
        assert_eq!(g.edges().filter(|e| e.source == "core.run").count(), 1);
    }

    #[test]
    fn calls_followed_through_private_functions() {
        let g = CallGraphBuilder
            .build(&model(), &GraphOptions::default())
            .unwrap();
        assert!(!g.contains_node("core.Engine._spin"));
        assert!(!g.contains_node("core._helper"));
        assert!(!g.contains_node("core.Engine"));
        assert!(!g.contains_node("core"));
        // start -> _spin -> leaf becomes start -> leaf
        assert!(g.has_edge("core.Engine.start", "core.leaf", EdgeKind::Calls));
        // run -> _helper -> leaf becomes run -> leaf
        assert!(g.has_edge("core.run", "core.leaf", EdgeKind::Calls));
        assert_eq!(g.node("core.leaf").unwrap().depth, Some(1));
    }

    #[test]
    fn hidden_graph_nodes_are_a_subset() {
        let mut m = ModuleFacts::new(Module::new("m", "m.py", false));
        let public = add_function(&mut m, "m", "pub", None);
        let private = add_function(&mut m, "m", "_priv", None);
        add_function(&mut m, "m", "leaf", None);
        m.calls.push(CallEdge::new(&public, "_priv", 2));
        m.calls.push(CallEdge::new(&private, "leaf", 4));
        let mut builder = ModelBuilder::new();
        builder.add(m);
        let model = builder.finish().0;

        let hidden = CallGraphBuilder.build(&model, &GraphOptions::default()).unwrap();
        let shown = CallGraphBuilder
            .build(&model, &GraphOptions::default().with_private(true))
            .unwrap();
        assert_eq!(hidden.node_ids(), BTreeSet::from(["m.leaf", "m.pub"]));
        assert!(hidden.node_ids().is_subset(&shown.node_ids()));
        assert!(hidden.has_edge("m.pub", "m.leaf", EdgeKind::Calls));
        assert!(shown.has_edge("m.pub", "m._priv", EdgeKind::Calls));
    }

    #[test]
    fn private_recursion_back_to_caller_is_dropped() {
        let mut m = ModuleFacts::new(Module::new("m", "m.py", false));
        let public = add_function(&mut m, "m", "walk", None);
        let private = add_function(&mut m, "m", "_step", None);
        m.calls.push(CallEdge::new(&public, "_step", 2));
        m.calls.push(CallEdge::new(&private, "_step", 4));
        m.calls.push(CallEdge::new(&private, "walk", 5));
        let mut builder = ModelBuilder::new();
        builder.add(m);
        let g = CallGraphBuilder
            .build(&builder.finish().0, &GraphOptions::default())
            .unwrap();
        assert_eq!(g.node_ids(), BTreeSet::from(["m.walk"]));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn focus_module_is_star_shaped() {
        let opts = GraphOptions::default()
            .with_private(true)
            .with_focus_module(Some("svc".to_string()));
        let g = CallGraphBuilder.build(&model(), &opts).unwrap();
        let ids: BTreeSet<&str> = g.node_ids();
        assert_eq!(ids, BTreeSet::from(["core.run", "other.job", "svc.main"]));
        assert_eq!(g.node("svc.main").unwrap().depth, Some(0));
        assert_eq!(g.node("core.run").unwrap().depth, Some(1));
        // run -> _helper is two hops from the focus and not kept
        assert!(!g.contains_node("core._helper"));

        let g = CallGraphBuilder
            .build(&model(), &opts.clone().with_max_depth(Some(0)))
            .unwrap();
        assert_eq!(g.node_ids(), BTreeSet::from(["svc.main"]));
    }

    #[test]
    fn unknown_focus_module_gives_empty_graph() {
        let opts = GraphOptions::default().with_focus_module(Some("nope".to_string()));
        let g = CallGraphBuilder.build(&model(), &opts).unwrap();
        assert!(g.is_empty());
    }

    #[test]
    fn depth_counts_call_hops_from_entries() {
        let opts = GraphOptions::default().with_private(true).with_max_depth(Some(1));
        let g = CallGraphBuilder.build(&model(), &opts).unwrap();
        // other.job is the entry; svc.main is one hop away; core.run is two
        assert!(g.contains_node("other.job"));
        assert!(g.contains_node("svc.main"));
        assert!(!g.contains_node("core.run"));
    }
}
