//! Accumulated dependency graph of discovered issues.
//!
//! Vertices are keyed by label, edges are stored as a set of ordered label
//! pairs. Both collections are ordered so that rendering is deterministic.

use crate::domain::{Edge, Vertex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Vertex and edge sets discovered by a traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueGraph {
    #[serde(serialize_with = "serialize_vertices")]
    vertices: BTreeMap<String, Vertex>,
    edges: BTreeSet<Edge>,
}

impl IssueGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vertex, returning true if the graph changed.
    ///
    /// A vertex for a fetched issue replaces a link placeholder with the same
    /// label. In every other case the vertex already present is kept.
    pub fn add_vertex(&mut self, vertex: Vertex) -> bool {
        match self.vertices.get(&vertex.label) {
            Some(existing)
                if !(existing.estimate.is_placeholder() && !vertex.estimate.is_placeholder()) =>
            {
                false
            }
            _ => {
                self.vertices.insert(vertex.label.clone(), vertex);
                true
            }
        }
    }

    /// Insert an edge, returning true if it was not already present.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        self.edges.insert(edge)
    }

    /// Merge newly discovered items into the graph.
    pub fn merge<V, E>(&mut self, vertices: V, edges: E)
    where
        V: IntoIterator<Item = Vertex>,
        E: IntoIterator<Item = Edge>,
    {
        for vertex in vertices {
            self.add_vertex(vertex);
        }
        for edge in edges {
            self.add_edge(edge);
        }
    }

    pub fn vertex(&self, label: &str) -> Option<&Vertex> {
        self.vertices.get(label)
    }

    /// Vertices in label order
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Edges in (from, to) order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Labels with no incoming edge, i.e. work nothing else waits on.
    pub fn roots(&self) -> Vec<&str> {
        let targets: HashSet<&str> = self.edges.iter().map(|e| e.to.as_str()).collect();
        self.vertices
            .keys()
            .map(String::as_str)
            .filter(|label| !targets.contains(label))
            .collect()
    }

    fn successors<'s>(&'s self, label: &'s str) -> impl Iterator<Item = &'s str> + 's {
        self.edges
            .iter()
            .filter(move |e| e.from == label)
            .map(|e| e.to.as_str())
    }

    /// Find a dependency cycle, returned as the labels along it.
    ///
    /// Tracker data is not guaranteed to be acyclic; a cycle usually means two
    /// issues were linked in both directions by mistake.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        let mut path = Vec::new();

        let starts: BTreeSet<&str> = self.edges.iter().map(|e| e.from.as_str()).collect();
        for start in starts {
            if !visited.contains(start) {
                if let Some(cycle) = self.cycle_dfs(start, &mut visited, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn cycle_dfs<'a>(
        &'a self,
        node: &'a str,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        visited.insert(node);
        path.push(node);

        for next in self.successors(node) {
            if let Some(pos) = path.iter().position(|p| *p == next) {
                return Some(path[pos..].iter().map(|s| s.to_string()).collect());
            }
            if !visited.contains(next) {
                if let Some(cycle) = self.cycle_dfs(next, visited, path) {
                    return Some(cycle);
                }
            }
        }

        path.pop();
        None
    }
}

fn serialize_vertices<S>(vertices: &BTreeMap<String, Vertex>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(vertices.values())
}
