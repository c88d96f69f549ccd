//! kgraph Graph - Knowledge graph construction and rendering
//!
//! Builds an in-memory directed multigraph from extracted triplets
//! (petgraph), lays it out with a spring model, and renders it as
//! SVG, Graphviz DOT, or JSON.

use std::collections::HashMap;

use kg_core::Triplet;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

pub mod layout;
pub mod render;

pub use layout::{Layout, Point, SpringLayout};
pub use render::{render, render_dot, render_json, render_svg};

/// A labelled edge as (source, target, relation)
pub type EdgeView<'a> = (&'a str, &'a str, &'a str);

/// Directed multigraph of subjects/objects connected by relations
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: DiGraph<String, String>,
    index: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph with one edge per triplet
    pub fn from_triplets(triplets: &[Triplet]) -> Self {
        let mut graph = Self::new();
        for triplet in triplets {
            graph.add_triplet(triplet);
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Knowledge graph built"
        );
        graph
    }

    /// Add a triplet; repeated subject/object pairs keep every edge
    pub fn add_triplet(&mut self, triplet: &Triplet) {
        let source = self.node(&triplet.subject);
        let target = self.node(&triplet.object);
        self.graph.add_edge(source, target, triplet.relation.clone());
    }

    fn node(&mut self, label: &str) -> NodeIndex {
        if let Some(&index) = self.index.get(label) {
            return index;
        }
        let index = self.graph.add_node(label.to_string());
        self.index.insert(label.to_string(), index);
        index
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node labels in first-appearance order
    pub fn nodes(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|i| self.graph[i].as_str())
            .collect()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> Vec<EdgeView<'_>> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].as_str(),
                    self.graph[e.target()].as_str(),
                    e.weight().as_str(),
                )
            })
            .collect()
    }

    /// Underlying petgraph graph
    pub fn inner(&self) -> &DiGraph<String, String> {
        &self.graph
    }
}
