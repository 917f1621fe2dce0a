//! Graph assembly tests
//!
//! Tests for node identity, edge deduplication, selector resolution,
//! reverse-edge bounds, and partial-result behavior under the governor.

use kubedeps::graph::builder::{GraphLimits, assemble_graph};
use kubedeps::graph::model::{Edge, Node, RelationshipType};
use serde_json::{Value, json};
use std::time::Duration;

fn pod(name: &str, namespace: &str, labels: Value) -> Value {
    json!({
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": labels,
            "creationTimestamp": "2026-02-01T10:00:00Z"
        },
        "status": {"phase": "Running"}
    })
}

fn service(name: &str, namespace: &str, selector: Value) -> Value {
    json!({
        "kind": "Service",
        "metadata": {"name": name, "namespace": namespace},
        "spec": {"selector": selector}
    })
}

#[test]
fn test_same_object_fetched_twice_yields_one_node() {
    let resources = vec![
        pod("web-0", "default", json!({"app": "web"})),
        pod("web-0", "default", json!({"app": "web"})),
    ];

    let graph = assemble_graph(&resources, Some("default"), &GraphLimits::default());
    assert_eq!(graph.node_count(), 1);
    assert!(graph.contains_node("Pod/web-0@default"));
}

#[test]
fn test_node_id_derivation_is_deterministic() {
    assert_eq!(
        Node::derive_id("Pod", "web-0", Some("default")),
        Node::derive_id("Pod", "web-0", Some("default"))
    );
    assert_eq!(Node::derive_id("Pod", "web-0", Some("default")), "Pod/web-0@default");
}

#[test]
fn test_no_two_edges_share_a_derived_id() {
    // Two containers referencing the same secret produce one edge
    let resources = vec![json!({
        "kind": "Pod",
        "metadata": {"name": "p", "namespace": "default"},
        "spec": {
            "containers": [
                {"name": "a", "envFrom": [{"secretRef": {"name": "creds"}}]},
                {"name": "b", "envFrom": [{"secretRef": {"name": "creds"}}]}
            ]
        }
    })];

    let graph = assemble_graph(&resources, Some("default"), &GraphLimits::default());

    let ids: Vec<&String> = graph.edges.keys().collect();
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(ids.len(), deduped.len());

    let forward: Vec<&Edge> = graph
        .edges
        .values()
        .filter(|e| e.relationship == RelationshipType::Environment && !e.id.ends_with(":reverse"))
        .collect();
    assert_eq!(forward.len(), 1);
}

#[test]
fn test_rerunning_same_rule_produces_same_single_edge() {
    let resources = vec![pod("p", "default", json!({})), service("svc", "default", json!({}))];

    let first = assemble_graph(&resources, Some("default"), &GraphLimits::default());
    let second = assemble_graph(&resources, Some("default"), &GraphLimits::default());

    let mut first_ids: Vec<&String> = first.edges.keys().collect();
    let mut second_ids: Vec<&String> = second.edges.keys().collect();
    first_ids.sort();
    second_ids.sort();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn test_selector_matches_exactly_one_pod() {
    let resources = vec![
        service("frontend", "default", json!({"app": "x"})),
        pod("match", "default", json!({"app": "x"})),
        pod("nomatch", "default", json!({"app": "y"})),
    ];

    let graph = assemble_graph(&resources, Some("default"), &GraphLimits::default());

    let service_edges: Vec<&Edge> = graph
        .edges
        .values()
        .filter(|e| e.relationship == RelationshipType::Service)
        .collect();
    assert_eq!(service_edges.len(), 1);
    assert_eq!(service_edges[0].source, "Service/frontend@default");
    assert_eq!(service_edges[0].target, "Pod/match@default");
}

#[test]
fn test_selector_requires_every_key_to_match() {
    let resources = vec![
        service("frontend", "default", json!({"app": "x", "tier": "web"})),
        pod("partial", "default", json!({"app": "x"})),
    ];

    let graph = assemble_graph(&resources, Some("default"), &GraphLimits::default());
    let service_edges = graph
        .edges
        .values()
        .filter(|e| e.relationship == RelationshipType::Service)
        .count();
    assert_eq!(service_edges, 0);
}

#[test]
fn test_selector_does_not_cross_namespaces() {
    let resources = vec![
        service("frontend", "a", json!({"app": "x"})),
        pod("other-ns", "b", json!({"app": "x"})),
    ];

    let graph = assemble_graph(&resources, None, &GraphLimits::default());
    let service_edges = graph
        .edges
        .values()
        .filter(|e| e.relationship == RelationshipType::Service)
        .count();
    assert_eq!(service_edges, 0);
}

#[test]
fn test_reverse_edge_count_never_exceeds_cap() {
    // 20 pods each mounting a distinct config map: 20 forward edges, but
    // reverse synthesis must stop at the cap
    let resources: Vec<Value> = (0..20)
        .map(|i| {
            json!({
                "kind": "Pod",
                "metadata": {"name": format!("p{}", i), "namespace": "default"},
                "spec": {
                    "volumes": [{"name": "cfg", "configMap": {"name": format!("cm{}", i)}}]
                }
            })
        })
        .collect();

    let limits = GraphLimits {
        max_reverse_edges: 5,
        ..GraphLimits::default()
    };
    let graph = assemble_graph(&resources, Some("default"), &limits);

    let reverse = graph
        .edges
        .values()
        .filter(|e| e.id.ends_with(":reverse"))
        .count();
    assert_eq!(reverse, 5);

    let forward = graph
        .edges
        .values()
        .filter(|e| e.relationship == RelationshipType::ConfigMap && !e.id.ends_with(":reverse"))
        .count();
    assert_eq!(forward, 20);
}

#[test]
fn test_near_zero_deadline_yields_wellformed_partial_graph() {
    let resources: Vec<Value> = (0..100)
        .map(|i| pod(&format!("p{}", i), "default", json!({})))
        .collect();

    let limits = GraphLimits {
        deadline: Duration::from_nanos(1),
        ..GraphLimits::default()
    };
    let graph = assemble_graph(&resources, Some("default"), &limits);

    assert!(graph.metadata.truncated);
    assert!(graph.node_count() < 100);
    assert_eq!(graph.metadata.node_count, graph.node_count());
    assert_eq!(graph.metadata.edge_count, graph.edge_count());

    // Every edge endpoint must resolve to a node
    for edge in graph.edges.values() {
        assert!(graph.contains_node(&edge.source), "dangling source {}", edge.source);
        assert!(graph.contains_node(&edge.target), "dangling target {}", edge.target);
    }
}

#[test]
fn test_cluster_scoped_node_cap() {
    let resources: Vec<Value> = (0..10)
        .map(|i| {
            json!({
                "kind": "Node",
                "metadata": {"name": format!("worker-{}", i)}
            })
        })
        .collect();

    let limits = GraphLimits {
        max_cluster_scoped_nodes: 3,
        ..GraphLimits::default()
    };
    let graph = assemble_graph(&resources, None, &limits);

    assert_eq!(graph.node_count(), 3);
    assert!(graph.metadata.truncated);
}

#[test]
fn test_max_nodes_limits_overall_graph() {
    let resources: Vec<Value> = (0..50)
        .map(|i| pod(&format!("p{}", i), "default", json!({})))
        .collect();

    let limits = GraphLimits {
        max_nodes: Some(10),
        ..GraphLimits::default()
    };
    let graph = assemble_graph(&resources, Some("default"), &limits);

    assert!(graph.node_count() <= 10);
    assert!(graph.metadata.truncated);
}

#[test]
fn test_malformed_object_is_skipped_not_fatal() {
    let resources = vec![
        json!({"kind": "Pod"}),
        json!({"unexpected": true}),
        pod("ok", "default", json!({})),
    ];

    let graph = assemble_graph(&resources, Some("default"), &GraphLimits::default());
    assert_eq!(graph.node_count(), 1);
    assert!(graph.contains_node("Pod/ok@default"));
    assert!(!graph.metadata.truncated);
}
