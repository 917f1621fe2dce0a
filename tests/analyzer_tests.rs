//! CRD schema analyzer tests
//!
//! Covers recursion termination, strong/weak heuristic classification,
//! CRD-to-CRD inference, and the API-group inventory.

use kubedeps::crd::{AnalyzerOptions, analyze_crds, api_group_inventory};
use kubedeps::graph::model::EdgeStrength;
use serde_json::{Value, json};

fn crd(kind: &str, group: &str, schema: Value) -> Value {
    json!({
        "metadata": {"name": format!("{}s.{}", kind.to_lowercase(), group)},
        "spec": {
            "group": group,
            "scope": "Namespaced",
            "names": {"kind": kind, "plural": format!("{}s", kind.to_lowercase())},
            "versions": [{
                "name": "v1",
                "served": true,
                "schema": {"openAPIV3Schema": schema}
            }]
        }
    })
}

/// Build a schema nested `depth` levels deep with a marker property at the
/// innermost level
fn deep_schema(depth: usize, innermost: Value) -> Value {
    let mut schema = innermost;
    for _ in 0..depth {
        schema = json!({"type": "object", "properties": {"child": schema}});
    }
    schema
}

#[test]
fn test_recursion_terminates_at_depth_bound() {
    // 50 levels of nesting with a secretRef only at the bottom; a walk
    // bounded at depth 10 must return without error and never see it
    let schema = deep_schema(50, json!({"properties": {"secretRef": {"type": "object"}}}));
    let doc = crd("Widget", "example.io", schema);

    let options = AnalyzerOptions {
        max_depth: 10,
        ..AnalyzerOptions::default()
    };
    let analysis = analyze_crds(&[doc], &options);

    assert_eq!(analysis.crds.len(), 1);
    assert!(
        analysis.crds[0].references.is_empty(),
        "no property beyond the depth bound may be visited"
    );
}

#[test]
fn test_references_within_depth_bound_are_found() {
    let schema = deep_schema(5, json!({"properties": {"secretRef": {"type": "object"}}}));
    let doc = crd("Widget", "example.io", schema);

    let options = AnalyzerOptions {
        max_depth: 10,
        ..AnalyzerOptions::default()
    };
    let analysis = analyze_crds(&[doc], &options);

    let refs = &analysis.crds[0].references;
    assert!(refs.iter().any(|r| r.kind == "Secret"));
}

#[test]
fn test_field_name_match_is_strong_description_mention_is_weak() {
    let doc = crd(
        "Widget",
        "example.io",
        json!({
            "properties": {
                "spec": {
                    "properties": {
                        "configMapRef": {"type": "object"},
                        "credentials": {
                            "type": "string",
                            "description": "Name of the Secret holding the credentials"
                        }
                    }
                }
            }
        }),
    );

    let analysis = analyze_crds(&[doc], &AnalyzerOptions::default());
    let refs = &analysis.crds[0].references;

    let config_map = refs.iter().find(|r| r.kind == "ConfigMap").unwrap();
    assert_eq!(config_map.strength, EdgeStrength::Strong);

    let secret = refs.iter().find(|r| r.kind == "Secret").unwrap();
    assert_eq!(secret.strength, EdgeStrength::Weak);
}

#[test]
fn test_description_only_mention_never_promoted_to_strong() {
    let doc = crd(
        "Widget",
        "example.io",
        json!({
            "properties": {
                "spec": {
                    "properties": {
                        "target": {
                            "type": "string",
                            "description": "The Service and the Secret this widget talks to"
                        }
                    }
                }
            }
        }),
    );

    let analysis = analyze_crds(&[doc], &AnalyzerOptions::default());
    assert!(
        analysis.crds[0]
            .references
            .iter()
            .all(|r| r.strength == EdgeStrength::Weak)
    );
}

#[test]
fn test_crd_to_crd_reference_via_field_name() {
    let widget = crd(
        "Widget",
        "example.io",
        json!({
            "properties": {
                "spec": {
                    "properties": {
                        "gadgetRef": {"type": "object"}
                    }
                }
            }
        }),
    );
    let gadget = crd("Gadget", "example.io", json!({}));

    let analysis = analyze_crds(&[widget, gadget], &AnalyzerOptions::default());

    let widget_refs = &analysis.crds[0].references;
    assert!(widget_refs.iter().any(|r| r.kind == "Gadget"));

    // The schema graph carries the corresponding edge
    let edge = analysis
        .graph
        .edges
        .values()
        .find(|e| e.source == "Widget/Widget" && e.target == "Gadget/Gadget");
    assert!(edge.is_some());
}

#[test]
fn test_crd_to_crd_mention_via_schema_substring_is_weak() {
    let widget = crd(
        "Widget",
        "example.io",
        json!({
            "properties": {
                "spec": {
                    "properties": {
                        "notes": {
                            "type": "string",
                            "description": "Pairs with a Gadget at runtime"
                        }
                    }
                }
            }
        }),
    );
    let gadget = crd("Gadget", "example.io", json!({}));

    let analysis = analyze_crds(&[widget, gadget], &AnalyzerOptions::default());
    let edge = analysis
        .graph
        .edges
        .values()
        .find(|e| e.source == "Widget/Widget" && e.target == "Gadget/Gadget")
        .expect("mention edge should exist");
    assert_eq!(edge.strength, EdgeStrength::Weak);
}

#[test]
fn test_schema_nodes_carry_group_version_scope_labels() {
    let doc = crd("Widget", "example.io", json!({}));
    let analysis = analyze_crds(&[doc], &AnalyzerOptions::default());

    let node = &analysis.graph.nodes["Widget/Widget"];
    assert_eq!(node.labels.get("apiGroup").map(|s| s.as_str()), Some("example.io"));
    assert_eq!(node.labels.get("versions").map(|s| s.as_str()), Some("v1"));
    assert_eq!(node.labels.get("scope").map(|s| s.as_str()), Some("Namespaced"));
}

#[test]
fn test_include_native_false_omits_core_kind_nodes() {
    let doc = crd(
        "Widget",
        "example.io",
        json!({
            "properties": {
                "spec": {"properties": {"secretRef": {"type": "object"}}}
            }
        }),
    );

    let options = AnalyzerOptions {
        include_native: false,
        ..AnalyzerOptions::default()
    };
    let analysis = analyze_crds(&[doc], &options);

    assert!(!analysis.graph.contains_node("Secret/Secret"));
    assert_eq!(analysis.graph.edge_count(), 0);
}

#[test]
fn test_unserved_versions_are_ignored() {
    let doc = json!({
        "metadata": {"name": "widgets.example.io"},
        "spec": {
            "group": "example.io",
            "scope": "Namespaced",
            "names": {"kind": "Widget", "plural": "widgets"},
            "versions": [{
                "name": "v1alpha1",
                "served": false,
                "schema": {"openAPIV3Schema": {
                    "properties": {"secretRef": {"type": "object"}}
                }}
            }]
        }
    });

    let analysis = analyze_crds(&[doc], &AnalyzerOptions::default());
    assert!(analysis.crds[0].versions.is_empty());
    assert!(analysis.crds[0].references.is_empty());
}

#[test]
fn test_malformed_crd_skipped_rest_of_batch_unaffected() {
    let bad = json!({"spec": {"nonsense": true}});
    let good = crd("Widget", "example.io", json!({}));

    let analysis = analyze_crds(&[bad, good], &AnalyzerOptions::default());
    assert_eq!(analysis.crds.len(), 1);
    assert_eq!(analysis.crds[0].kind, "Widget");
}

#[test]
fn test_api_group_inventory() {
    let docs = vec![
        crd("Widget", "example.io", json!({})),
        crd("Gadget", "example.io", json!({})),
        crd("Gizmo", "other.io", json!({})),
    ];

    let inventory = api_group_inventory(&docs);
    assert_eq!(inventory.len(), 2);

    let example = inventory.iter().find(|g| g.group == "example.io").unwrap();
    assert_eq!(example.crd_count, 2);
    assert!(example.kinds.contains(&"Widget".to_string()));
    assert!(example.kinds.contains(&"Gadget".to_string()));
    assert_eq!(example.versions, vec!["v1".to_string()]);
}
