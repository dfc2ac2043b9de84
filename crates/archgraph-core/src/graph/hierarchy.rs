//! Class-hierarchy builder: one node per class, child → parent edges.

use crate::facts::{ClassDecl, Resolution, StructuralModel};

use super::filter::{apply_depths, depths, is_private_name};
use super::{
    DirectedGraph, EdgeKind, GraphBuilder, GraphError, GraphKind, GraphOptions, Member,
    MemberKind, Node, NodeKind,
};

/// Builds [`GraphKind::ClassHierarchy`] graphs.
///
/// Depth is the number of inheritance hops from a root class, i.e. a class
/// with no base among the graph's nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassHierarchyBuilder;

impl GraphBuilder for ClassHierarchyBuilder {
    fn kind(&self) -> GraphKind {
        GraphKind::ClassHierarchy
    }

    fn build(
        &self,
        model: &StructuralModel,
        options: &GraphOptions,
    ) -> Result<DirectedGraph, GraphError> {
        let limit = options.depth_limit()?;
        let mut graph = DirectedGraph::new(GraphKind::ClassHierarchy);

        for class in model.classes() {
            if !options.include_private && model.is_private_symbol(&class.id) {
                continue;
            }
            graph.add_node(class_node(model, class, options));
        }

        for edge in model.inherits() {
            if !graph.contains_node(&edge.child) {
                continue;
            }
            match &edge.parent.resolution {
                Resolution::Internal { id } => {
                    graph.add_edge(&edge.child, id, EdgeKind::Inherits);
                }
                Resolution::External { package } if options.include_external => {
                    let id = external_id(package, &edge.parent.raw);
                    graph.add_node(
                        Node::new(id.clone(), edge.parent.raw.clone(), NodeKind::Class)
                            .external()
                            .with_module(package.clone()),
                    );
                    graph.add_edge(&edge.child, &id, EdgeKind::Inherits);
                }
                _ => {}
            }
        }

        let depths = depths(&graph, EdgeKind::Inherits, true);
        apply_depths(&mut graph, &depths, limit);
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built class hierarchy"
        );
        Ok(graph)
    }
}

/// Placeholder id for an external base, keyed by package so equal spellings
/// from different packages stay apart.
fn external_id(package: &str, raw: &str) -> String {
    format!("external:{}:{}", package, raw)
}

fn class_node(model: &StructuralModel, class: &ClassDecl, options: &GraphOptions) -> Node {
    let mut node = Node::new(class.id.clone(), class.name.clone(), NodeKind::Class)
        .with_module(class.module.clone());

    if options.include_methods {
        for method in class.methods.iter().filter_map(|id| model.function(id)) {
            if !options.include_private && is_private_name(&method.name) {
                continue;
            }
            node.members.push(Member {
                name: method.name.clone(),
                kind: MemberKind::Method,
                detail: Some(method.signature()),
            });
        }
    }
    if options.include_attributes {
        for attr in &class.attributes {
            if !options.include_private && attr.visibility.is_private() {
                continue;
            }
            node.members.push(Member {
                name: attr.name.clone(),
                kind: MemberKind::Attribute,
                detail: attr.annotation.clone(),
            });
        }
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{
        Attribute, ClassDecl, FunctionDecl, ImportStatement, ImportedName, Module,
        ModelBuilder, ModuleFacts,
    };
    use std::collections::BTreeSet;

    fn model() -> StructuralModel {
        let mut m = ModuleFacts::new(Module::new("m", "m.py", false));
        m.module.imports.push(ImportStatement::from_import(
            "abc",
            0,
            vec![ImportedName {
                name: "ABC".into(),
                alias: None,
            }],
            1,
        ));
        let mut base = ClassDecl::new("m", "m", "Base", 2).with_bases(["ABC"]);
        base.attributes = vec![
            Attribute::new("name", Some("str".into())),
            Attribute::new("_cache", None),
        ];
        let init = FunctionDecl::new("m", "m.Base", "__init__", 3).in_class("m.Base");
        let run = FunctionDecl::new("m", "m.Base", "run", 5).in_class("m.Base");
        base.methods = vec![init.id.clone(), run.id.clone()];
        let child = ClassDecl::new("m", "m", "Child", 8).with_bases(["Base"]);
        let leaf = ClassDecl::new("m", "m", "Leaf", 10).with_bases(["Child", "Unknown"]);
        let hidden = ClassDecl::new("m", "m", "_Hidden", 12).with_bases(["Base"]);
        for c in [&base, &child, &leaf, &hidden] {
            m.module.classes.push(c.id.clone());
        }
        m.classes = vec![base, child, leaf, hidden];
        m.functions = vec![init, run];

        let mut builder = ModelBuilder::new();
        builder.add(m);
        builder.finish().0
    }

    fn ids(graph: &DirectedGraph) -> BTreeSet<&str> {
        graph.node_ids()
    }

    #[test]
    fn internal_edges_child_to_parent() {
        let g = ClassHierarchyBuilder
            .build(&model(), &GraphOptions::default())
            .unwrap();
        assert_eq!(ids(&g), BTreeSet::from(["m.Base", "m.Child", "m.Leaf"]));
        assert!(g.has_edge("m.Child", "m.Base", EdgeKind::Inherits));
        assert!(g.has_edge("m.Leaf", "m.Child", EdgeKind::Inherits));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn members_respect_visibility() {
        let g = ClassHierarchyBuilder
            .build(&model(), &GraphOptions::default())
            .unwrap();
        let base = g.node("m.Base").unwrap();
        let names: Vec<&str> = base.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["run", "name"]);

        let g = ClassHierarchyBuilder
            .build(&model(), &GraphOptions::default().with_private(true))
            .unwrap();
        let base = g.node("m.Base").unwrap();
        assert_eq!(base.members.len(), 4);
        assert!(g.contains_node("m._Hidden"));
    }

    #[test]
    fn members_can_be_turned_off() {
        let opts = GraphOptions::default()
            .with_methods(false)
            .with_attributes(false);
        let g = ClassHierarchyBuilder.build(&model(), &opts).unwrap();
        assert!(g.node("m.Base").unwrap().members.is_empty());
    }

    #[test]
    fn external_bases_as_placeholders() {
        let g = ClassHierarchyBuilder
            .build(&model(), &GraphOptions::default().with_external(true))
            .unwrap();
        let ext = g.node("external:abc:ABC").unwrap();
        assert!(ext.external);
        assert_eq!(ext.label, "ABC");
        assert_eq!(ext.module.as_deref(), Some("abc"));
        assert!(g.has_edge("m.Base", "external:abc:ABC", EdgeKind::Inherits));
        // unresolved bases never become nodes
        assert!(g.nodes().filter(|n| n.external).count() == 1);
    }

    #[test]
    fn same_external_spelling_from_two_packages() {
        let mut builder = ModelBuilder::new();
        for (name, package) in [("web", "django.db"), ("orm", "peewee")] {
            let mut f = ModuleFacts::new(Module::new(name, format!("{}.py", name), false));
            f.module.imports.push(ImportStatement::from_import(
                package,
                0,
                vec![ImportedName {
                    name: "models".into(),
                    alias: None,
                }],
                1,
            ));
            let class = ClassDecl::new(name, name, "Row", 2).with_bases(["models.Model"]);
            f.module.classes.push(class.id.clone());
            f.classes.push(class);
            builder.add(f);
        }
        let model = builder.finish().0;
        let g = ClassHierarchyBuilder
            .build(&model, &GraphOptions::default().with_external(true))
            .unwrap();
        assert!(g.has_edge("web.Row", "external:django:models.Model", EdgeKind::Inherits));
        assert!(g.has_edge("orm.Row", "external:peewee:models.Model", EdgeKind::Inherits));
        assert_eq!(
            g.node("external:peewee:models.Model").unwrap().module.as_deref(),
            Some("peewee")
        );
    }

    #[test]
    fn depth_counts_inheritance_hops() {
        let g = ClassHierarchyBuilder
            .build(&model(), &GraphOptions::default().with_max_depth(Some(1)))
            .unwrap();
        assert_eq!(ids(&g), BTreeSet::from(["m.Base", "m.Child"]));
        assert_eq!(g.node("m.Child").unwrap().depth, Some(1));
    }

    #[test]
    fn empty_model_gives_empty_graph() {
        let g = ClassHierarchyBuilder
            .build(&StructuralModel::default(), &GraphOptions::default())
            .unwrap();
        assert!(g.is_empty());
    }

    #[test]
    fn negative_depth_fails() {
        let err = ClassHierarchyBuilder
            .build(&model(), &GraphOptions::default().with_max_depth(Some(-2)))
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidOption { .. }));
    }
}
