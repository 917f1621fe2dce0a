//! Size-limited Mermaid diagram rendering
//!
//! The diagram embedded in the Markdown report cannot show an arbitrarily
//! large graph. Nodes are ranked by connection degree and the most-connected
//! subset is drawn; edges are limited to those among the selected nodes, up
//! to a separate budget. The canonical graph is never modified.

use crate::graph::model::{DependencyGraph, Edge, Node};
use std::collections::HashMap;

/// Diagram size budget
#[derive(Debug, Clone)]
pub struct DiagramLimits {
    /// Max nodes drawn, most-connected first
    pub max_nodes: usize,
    /// Max edges drawn among the selected nodes
    pub max_edges: usize,
}

impl Default for DiagramLimits {
    fn default() -> Self {
        Self {
            max_nodes: 25,
            max_edges: 50,
        }
    }
}

/// Render the graph as a Mermaid flowchart, degrading to an explicit
/// placeholder when filtering removes all nodes or edges
pub fn render_mermaid(graph: &DependencyGraph, limits: &DiagramLimits) -> String {
    let selected = select_nodes(graph, limits.max_nodes);
    if selected.is_empty() {
        return "_No diagram data: the graph contains no nodes._".to_string();
    }

    let selected_ids: HashMap<&str, usize> = selected
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect();

    let edges = select_edges(graph, &selected_ids, limits.max_edges);

    let mut out = String::from("```mermaid\ngraph TD\n");
    for (idx, node) in selected.iter().enumerate() {
        out.push_str(&format!("    n{}[\"{}\"]\n", idx, escape_label(&node.id)));
    }

    if edges.is_empty() {
        out.push_str("```\n");
        out.push_str("\n_No diagram data: no edges connect the selected nodes._\n");
        return out;
    }

    for edge in &edges {
        let source = selected_ids[edge.source.as_str()];
        let target = selected_ids[edge.target.as_str()];
        out.push_str(&format!(
            "    n{} -->|\"{} {}\"| n{}\n",
            source,
            edge.relationship.glyph(),
            edge.relationship.as_str(),
            target
        ));
    }
    for (idx, edge) in edges.iter().enumerate() {
        out.push_str(&format!(
            "    linkStyle {} stroke:{}\n",
            idx,
            edge.relationship.color()
        ));
    }
    out.push_str("```\n");
    out
}

/// Pick the most-connected nodes, ties broken by id for determinism
fn select_nodes(graph: &DependencyGraph, max_nodes: usize) -> Vec<&Node> {
    let mut degrees: HashMap<&str, usize> = HashMap::new();
    for edge in graph.edges.values() {
        *degrees.entry(edge.source.as_str()).or_insert(0) += 1;
        *degrees.entry(edge.target.as_str()).or_insert(0) += 1;
    }

    let mut nodes: Vec<&Node> = graph.nodes.values().collect();
    nodes.sort_by(|a, b| {
        let da = degrees.get(a.id.as_str()).copied().unwrap_or(0);
        let db = degrees.get(b.id.as_str()).copied().unwrap_or(0);
        db.cmp(&da).then_with(|| a.id.cmp(&b.id))
    });
    nodes.truncate(max_nodes);
    nodes
}

/// Edges whose endpoints are both selected, sorted by id, up to the budget
fn select_edges<'a>(
    graph: &'a DependencyGraph,
    selected_ids: &HashMap<&str, usize>,
    max_edges: usize,
) -> Vec<&'a Edge> {
    let mut edges: Vec<&Edge> = graph
        .edges
        .values()
        .filter(|edge| {
            selected_ids.contains_key(edge.source.as_str())
                && selected_ids.contains_key(edge.target.as_str())
        })
        .collect();
    edges.sort_by(|a, b| a.id.cmp(&b.id));
    edges.truncate(max_edges);
    edges
}

/// Mermaid labels break on quotes and brackets
fn escape_label(label: &str) -> String {
    label
        .replace('"', "'")
        .replace('[', "(")
        .replace(']', ")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{EdgeMetadata, EdgeStrength, RelationshipType};
    use std::collections::BTreeMap;

    fn test_graph(node_count: usize) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for i in 0..node_count {
            graph.add_node(Node {
                id: format!("Pod/p{}@default", i),
                kind: "Pod".to_string(),
                name: format!("p{}", i),
                namespace: Some("default".to_string()),
                labels: BTreeMap::new(),
                creation_timestamp: None,
                status: "Running".to_string(),
            });
        }
        graph
    }

    #[test]
    fn test_empty_graph_placeholder() {
        let graph = DependencyGraph::new();
        let rendered = render_mermaid(&graph, &DiagramLimits::default());
        assert!(rendered.contains("No diagram data"));
        assert!(!rendered.contains("```mermaid"));
    }

    #[test]
    fn test_no_edges_placeholder() {
        let graph = test_graph(2);
        let rendered = render_mermaid(&graph, &DiagramLimits::default());
        assert!(rendered.contains("```mermaid"));
        assert!(rendered.contains("no edges connect"));
    }

    #[test]
    fn test_node_cap_applied() {
        let graph = test_graph(30);
        let limits = DiagramLimits {
            max_nodes: 5,
            max_edges: 50,
        };
        let rendered = render_mermaid(&graph, &limits);
        let node_lines = rendered.lines().filter(|l| l.trim_start().starts_with('n') && l.contains('[')).count();
        assert_eq!(node_lines, 5);
    }

    #[test]
    fn test_most_connected_selected_first() {
        let mut graph = test_graph(3);
        // p0 gets two edges, p1 one, p2 none
        for target in ["Pod/p1@default", "Pod/p2@default"] {
            graph.add_edge(Edge {
                id: Edge::derive_id("Pod/p0@default", target, RelationshipType::Service),
                source: "Pod/p0@default".to_string(),
                target: target.to_string(),
                relationship: RelationshipType::Service,
                strength: EdgeStrength::Strong,
                metadata: EdgeMetadata {
                    field: "spec".to_string(),
                    reason: "test".to_string(),
                },
            });
        }

        let limits = DiagramLimits {
            max_nodes: 1,
            max_edges: 50,
        };
        let rendered = render_mermaid(&graph, &limits);
        assert!(rendered.contains("Pod/p0@default"));
        assert!(!rendered.contains("Pod/p2@default"));
    }
}
