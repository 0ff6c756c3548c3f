//! Reference Graph
//!
//! Directed graph of resolved entity references, used to report cycles.
//! Cycles are legal in the emitted code (classes import each other), so they
//! are surfaced as warnings rather than failures.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::catalog::EntityCatalog;

/// Entity-level reference graph
#[derive(Debug)]
pub struct ReferenceGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl ReferenceGraph {
    /// Build from a resolved catalog; one node per entity, one edge per reference
    pub fn from_catalog(catalog: &EntityCatalog) -> Self {
        let count = catalog.len();
        let mut graph = DiGraph::with_capacity(count, count * 2);
        let mut nodes = HashMap::with_capacity(count);

        for entry in catalog.entries() {
            let idx = graph.add_node(entry.name().to_string());
            nodes.insert(entry.name().to_string(), idx);
        }

        for entry in catalog.entries() {
            let Some(&from) = nodes.get(entry.name()) else { continue };
            for reference in &entry.references {
                if let Some(&to) = nodes.get(&reference.entity) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self { graph, nodes }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Entities `entity` references directly
    pub fn dependencies(&self, entity: &str) -> Vec<&str> {
        let Some(&idx) = self.nodes.get(entity) else {
            return Vec::new();
        };
        let mut deps: Vec<&str> = self
            .graph
            .neighbors(idx)
            .filter_map(|n| self.graph.node_weight(n).map(String::as_str))
            .collect();
        deps.sort_unstable();
        deps
    }

    /// Groups of entities that reference each other, each sorted by name.
    ///
    /// Self references never reach the catalog, so every group has at least
    /// two members.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut groups: Vec<Vec<String>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut names: Vec<String> = scc
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).cloned())
                    .collect();
                names.sort();
                names
            })
            .collect();
        groups.sort();
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReferencedSchema;
    use crate::schema::{EntityDescriptor, Properties, SchemaDocument};

    fn catalog(edges: &[(&str, &str)], names: &[&str]) -> EntityCatalog {
        let mut catalog = EntityCatalog::default();
        for name in names {
            catalog
                .insert(
                    EntityDescriptor::new(*name, format!("/api/{}", name)),
                    SchemaDocument::new(name.to_uppercase(), Properties::new()),
                )
                .unwrap();
        }
        for (index, name) in names.iter().enumerate() {
            let references = edges
                .iter()
                .filter(|(from, _)| from == name)
                .map(|(_, to)| ReferencedSchema {
                    entity: to.to_string(),
                    href: format!("/api/{}", to),
                    title: to.to_uppercase(),
                })
                .collect();
            catalog.get_mut(index).unwrap().references = references;
        }
        catalog
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let graph = ReferenceGraph::from_catalog(&catalog(
            &[("books", "authors"), ("books", "publishers")],
            &["books", "authors", "publishers"],
        ));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.cycles().is_empty());
        assert_eq!(graph.dependencies("books"), vec!["authors", "publishers"]);
        assert!(graph.dependencies("authors").is_empty());
    }

    #[test]
    fn test_mutual_references_form_a_cycle() {
        let graph = ReferenceGraph::from_catalog(&catalog(
            &[("books", "authors"), ("authors", "books"), ("stores", "books")],
            &["books", "authors", "stores"],
        ));
        assert_eq!(graph.cycles(), vec![vec!["authors".to_string(), "books".to_string()]]);
    }

    #[test]
    fn test_unknown_entity_has_no_dependencies() {
        let graph = ReferenceGraph::from_catalog(&EntityCatalog::default());
        assert!(graph.dependencies("ghosts").is_empty());
        assert!(graph.cycles().is_empty());
    }
}
