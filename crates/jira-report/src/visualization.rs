//! Export of the issue dependency graph to text formats.
//!
//! DOT (Graphviz) is the primary output; Mermaid is offered for pasting into
//! Markdown documents. Node colors are derived from the issue status.

use crate::domain::Vertex;
use crate::graph::IssueGraph;
use crate::label::LINE_BREAK;
use std::collections::HashMap;
use std::str::FromStr;

/// Fill color for statuses missing from [`STATUS_COLORS`].
pub const DEFAULT_COLOR: &str = "orange";

/// Fill color per workflow status.
pub const STATUS_COLORS: &[(&str, &str)] = &[
    ("Open", "AliceBlue"),
    ("Reopened", "AliceBlue"),
    ("Ready for Review", "lightpink"),
    ("Ready for Development", "lightyellow"),
    ("In Development", "aquamarine"),
    ("Code Review", "lightblue"),
    ("Formal Testing in Progress", "lightblue"),
    ("Closed", "PaleGreen"),
];

/// Look up the fill color for a status, falling back to [`DEFAULT_COLOR`].
pub fn status_color(status: &str) -> &'static str {
    STATUS_COLORS
        .iter()
        .find(|(name, _)| *name == status)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

/// Supported text formats for the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphFormat {
    #[default]
    Dot,
    Mermaid,
    Json,
}

impl FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" | "graphviz" => Ok(GraphFormat::Dot),
            "mermaid" => Ok(GraphFormat::Mermaid),
            "json" => Ok(GraphFormat::Json),
            _ => Err(format!(
                "Unsupported format: {}. Use 'dot', 'mermaid' or 'json'",
                s
            )),
        }
    }
}

/// Quote a label as a DOT string.
///
/// A `\n` line break is kept as an escape; any other backslash and every
/// double quote is escaped so the string always terminates.
fn quote(label: &str) -> String {
    let mut quoted = String::with_capacity(label.len() + 2);
    quoted.push('"');

    let mut chars = label.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'n') => {
                chars.next();
                quoted.push_str(LINE_BREAK);
            }
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            _ => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}

/// Export the graph as DOT for Graphviz
///
/// Generates a directed graph with one filled node per vertex, colored by
/// status, and one `->` edge per dependency.
///
/// # Example
/// ```
/// use jira_report::domain::{Estimate, Vertex};
/// use jira_report::graph::IssueGraph;
/// use jira_report::visualization::export_dot;
///
/// let mut graph = IssueGraph::new();
/// graph.add_vertex(Vertex::new("A-1 Fix bug", "Open", Estimate::Points(2.0)));
///
/// let dot = export_dot(&graph);
/// assert!(dot.contains(r#""A-1 Fix bug" [color="AliceBlue"];"#));
/// assert!(!dot.contains("->"));
/// ```
pub fn export_dot(graph: &IssueGraph) -> String {
    let mut output = String::from("digraph G {\n");
    output.push_str("  node [fontname=\"Verdana\", style=\"filled\"];\n");

    for vertex in graph.vertices() {
        output.push_str(&format!(
            "  {} [color=\"{}\"];\n",
            quote(&vertex.label),
            status_color(&vertex.status)
        ));
    }

    for edge in graph.edges() {
        output.push_str(&format!("  {} -> {};\n", quote(&edge.from), quote(&edge.to)));
    }

    output.push_str("}\n");
    output
}

/// Export the graph as a Mermaid flowchart
///
/// Labels are not valid Mermaid identifiers, so nodes get positional ids
/// (`n0`, `n1`, ...). Edge endpoints that are not vertices get ids too.
pub fn export_mermaid(graph: &IssueGraph) -> String {
    let mut nodes = MermaidNodes::default();
    for vertex in graph.vertices() {
        nodes.id(&vertex.label, Some(vertex));
    }

    let mut edges = String::new();
    for edge in graph.edges() {
        let from = nodes.id(&edge.from, None);
        let to = nodes.id(&edge.to, None);
        edges.push_str(&format!("  {} --> {}\n", from, to));
    }

    let mut output = String::from("graph LR\n");
    output.push_str(&nodes.declarations);
    output.push('\n');
    output.push_str(&edges);

    if !nodes.styles.is_empty() {
        output.push('\n');
        output.push_str(&nodes.styles);
    }

    output
}

#[derive(Default)]
struct MermaidNodes<'a> {
    ids: HashMap<&'a str, String>,
    declarations: String,
    styles: String,
}

impl<'a> MermaidNodes<'a> {
    fn id(&mut self, label: &'a str, vertex: Option<&Vertex>) -> String {
        if let Some(id) = self.ids.get(label) {
            return id.clone();
        }

        let id = format!("n{}", self.ids.len());
        let text = label.replace(LINE_BREAK, "<br/>").replace('"', "#quot;");
        self.declarations
            .push_str(&format!("  {}[\"{}\"]\n", id, text));
        if let Some(vertex) = vertex {
            self.styles.push_str(&format!(
                "  style {} fill:{}\n",
                id,
                status_color(&vertex.status).to_lowercase()
            ));
        }
        self.ids.insert(label, id.clone());
        id
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{Edge, Estimate};
    use proptest::prelude::*;

    fn label() -> impl Strategy<Value = String> {
        prop::string::string_regex("[A-Z]{1,3}-[0-9]{1,3}( [a-z]{1,6}){0,4}").unwrap()
    }

    fn status() -> impl Strategy<Value = String> {
        prop::sample::select(vec![
            "Open".to_string(),
            "Closed".to_string(),
            "In Development".to_string(),
            "Something Else".to_string(),
        ])
    }

    proptest! {
        /// Property: one node line per vertex and one edge line per edge
        #[test]
        fn prop_dot_declares_each_item_once(
            vertices in prop::collection::vec((label(), status()), 0..12),
            edge_picks in prop::collection::vec((0usize..12, 0usize..12), 0..20)
        ) {
            let mut graph = IssueGraph::new();
            for (label, status) in &vertices {
                graph.add_vertex(Vertex::new(label.clone(), status.clone(), Estimate::Placeholder));
            }
            if !vertices.is_empty() {
                for (a, b) in edge_picks {
                    let from = &vertices[a % vertices.len()].0;
                    let to = &vertices[b % vertices.len()].0;
                    graph.add_edge(Edge::new(from.clone(), to.clone()));
                }
            }

            let dot = export_dot(&graph);
            let node_lines = dot.lines().filter(|l| l.contains(" [color=")).count();
            let edge_lines = dot.lines().filter(|l| l.contains(" -> ")).count();

            prop_assert_eq!(node_lines, graph.vertex_count());
            prop_assert_eq!(edge_lines, graph.edge_count());

            for vertex in graph.vertices() {
                let declaration = format!("  \"{}\" [color=", vertex.label);
                prop_assert_eq!(dot.matches(&declaration).count(), 1);
            }
        }
    }
}
