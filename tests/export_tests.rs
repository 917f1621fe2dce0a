//! Export rendering tests
//!
//! All three renderers consume the same canonical graph; metadata counts
//! must describe that graph before any diagram size limiting.

use kubedeps::export::{DiagramLimits, ExportFormat, render_graph, render_graph_csv, render_graph_json, render_graph_markdown, render_mermaid};
use kubedeps::graph::builder::{GraphLimits, assemble_graph};
use kubedeps::graph::model::DependencyGraph;
use serde_json::{Value, json};

fn sample_graph() -> DependencyGraph {
    let mut resources: Vec<Value> = (0..30)
        .map(|i| {
            json!({
                "kind": "Pod",
                "metadata": {
                    "name": format!("p{}", i),
                    "namespace": "default",
                    "labels": {"app": "web"}
                },
                "spec": {
                    "volumes": [{"name": "cfg", "configMap": {"name": "shared-config"}}]
                },
                "status": {"phase": "Running"}
            })
        })
        .collect();
    resources.push(json!({
        "kind": "Service",
        "metadata": {"name": "frontend", "namespace": "default"},
        "spec": {"selector": {"app": "web"}}
    }));

    assemble_graph(&resources, Some("default"), &GraphLimits::default())
}

#[test]
fn test_json_metadata_counts_equal_canonical_counts() {
    let graph = sample_graph();
    let rendered = render_graph_json(&graph);

    let nodes = rendered["nodes"].as_array().unwrap();
    let edges = rendered["edges"].as_array().unwrap();
    assert_eq!(nodes.len(), graph.node_count());
    assert_eq!(edges.len(), graph.edge_count());
    assert_eq!(rendered["metadata"]["nodeCount"].as_u64().unwrap() as usize, graph.node_count());
    assert_eq!(rendered["metadata"]["edgeCount"].as_u64().unwrap() as usize, graph.edge_count());
}

#[test]
fn test_markdown_reports_canonical_counts_despite_diagram_limit() {
    let graph = sample_graph();
    let diagram = DiagramLimits {
        max_nodes: 5,
        max_edges: 3,
    };
    let rendered = render_graph_markdown(&graph, &diagram);

    // The prose summary quotes the canonical counts, not the diagram's
    assert!(rendered.contains(&format!("{} resources", graph.metadata.node_count)));
    assert!(rendered.contains(&format!("{} relationships", graph.metadata.edge_count)));

    // The diagram itself is capped
    let diagram_nodes = rendered
        .lines()
        .filter(|l| l.trim_start().starts_with('n') && l.contains('[') && !l.contains("-->"))
        .count();
    assert_eq!(diagram_nodes, 5);
}

#[test]
fn test_csv_has_two_sections_with_expected_rows() {
    let graph = sample_graph();
    let rendered = render_graph_csv(&graph);

    assert!(rendered.contains("# Nodes\n"));
    assert!(rendered.contains("# Edges\n"));

    let node_section: Vec<&str> = rendered
        .split("# Edges")
        .next()
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("id,"))
        .collect();
    assert_eq!(node_section.len(), graph.node_count());

    let edge_section: Vec<&str> = rendered
        .split("# Edges")
        .nth(1)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with("source,"))
        .collect();
    assert_eq!(edge_section.len(), graph.edge_count());
}

#[test]
fn test_empty_graph_markdown_has_placeholder() {
    let graph = DependencyGraph::new();
    let rendered = render_graph_markdown(&graph, &DiagramLimits::default());
    assert!(rendered.contains("No diagram data"));
}

#[test]
fn test_diagram_edge_budget() {
    let graph = sample_graph();
    let diagram = DiagramLimits {
        max_nodes: 31,
        max_edges: 4,
    };
    let rendered = render_mermaid(&graph, &diagram);
    let edge_lines = rendered.lines().filter(|l| l.contains("-->")).count();
    assert_eq!(edge_lines, 4);
}

#[test]
fn test_most_connected_nodes_prioritized() {
    let graph = sample_graph();
    let diagram = DiagramLimits {
        max_nodes: 2,
        max_edges: 10,
    };
    let rendered = render_mermaid(&graph, &diagram);

    // shared-config (referenced by 30 pods) and frontend (30 selector
    // edges) dominate by degree
    assert!(rendered.contains("ConfigMap/shared-config@default"));
    assert!(rendered.contains("Service/frontend@default"));
}

#[test]
fn test_render_graph_dispatch_and_format_errors() {
    let graph = sample_graph();

    for format in [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Markdown] {
        let rendered = render_graph(&graph, format, &DiagramLimits::default()).unwrap();
        assert!(!rendered.is_empty());
    }

    assert!("pdf".parse::<ExportFormat>().is_err());
    assert_eq!("markdown".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
}

#[test]
fn test_truncated_metadata_survives_export() {
    let resources: Vec<Value> = (0..10)
        .map(|i| {
            json!({
                "kind": "Pod",
                "metadata": {"name": format!("p{}", i), "namespace": "default"}
            })
        })
        .collect();
    let limits = GraphLimits {
        max_resources_per_type: 2,
        ..GraphLimits::default()
    };
    let graph = assemble_graph(&resources, Some("default"), &limits);

    let rendered = render_graph_json(&graph);
    assert_eq!(rendered["metadata"]["truncated"], json!(true));

    let markdown = render_graph_markdown(&graph, &DiagramLimits::default());
    assert!(markdown.contains("Partial result"));
}
