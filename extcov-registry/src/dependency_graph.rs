//! Inter-namespace dependency graph using petgraph
//!
//! A namespace may reuse functions of another namespace under an alias. Each
//! declared alias is one edge from the declaring namespace to its target.
//! Targets that were not loaded are kept as external nodes.

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::{Direction, Graph as PetGraph};
use std::collections::HashMap;

/// Directed graph of namespace keys; edges carry the alias
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: PetGraph<String, String>,
    /// Map from namespace key to graph node index
    key_to_node: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node for `key` if it does not exist
    pub fn add_namespace(&mut self, key: &str) -> NodeIndex {
        if let Some(&node) = self.key_to_node.get(key) {
            return node;
        }
        let node = self.graph.add_node(key.to_string());
        self.key_to_node.insert(key.to_string(), node);
        node
    }

    /// Record that `from` depends on `to` under `alias`
    pub fn add_dependency(&mut self, from: &str, alias: &str, to: &str) {
        let from_node = self.add_namespace(from);
        let to_node = self.add_namespace(to);
        self.graph.add_edge(from_node, to_node, alias.to_string());
    }

    /// Total number of dependency edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct dependencies of `key` in declaration order, as (alias, target)
    pub fn dependencies_of(&self, key: &str) -> Vec<(&str, &str)> {
        let Some(&node) = self.key_to_node.get(key) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.weight().as_str(), self.graph[edge.target()].as_str()))
            .collect();
        // petgraph walks outgoing edges newest first
        edges.sort_by_key(|(id, _, _)| *id);
        edges
            .into_iter()
            .map(|(_, alias, target)| (alias, target))
            .collect()
    }
}
