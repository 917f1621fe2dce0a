//! Second-pass label-selector resolution
//!
//! Selector placeholders collected by the rule engine are matched against
//! the full node set once discovery is complete. A pod matches iff every
//! selector key maps to an identical pod-label value; missing keys or value
//! mismatches disqualify. Selectors with no matches leave no edge.

use crate::graph::model::{DependencyGraph, Edge, EdgeMetadata, EdgeStrength, Node};
use crate::graph::rules::SelectorPlaceholder;
use crate::models::KnownKind;
use std::collections::BTreeMap;

/// Check whether a node's labels satisfy a selector map
pub fn labels_match(selector: &BTreeMap<String, String>, labels: &BTreeMap<String, String>) -> bool {
    selector
        .iter()
        .all(|(key, value)| labels.get(key).map(|v| v == value) == Some(true))
}

/// Resolve all placeholders against the graph's Pod nodes, emitting one
/// concrete strong edge per match. Returns the number of edges added.
pub fn resolve_selectors(graph: &mut DependencyGraph, placeholders: &[SelectorPlaceholder]) -> usize {
    let pod_kind = KnownKind::Pod.as_str();

    // Collect matches first: placeholders borrow nothing from the graph,
    // but the edge inserts need mutable access
    let mut resolved: Vec<Edge> = Vec::new();

    for placeholder in placeholders {
        let matches: Vec<&Node> = graph
            .nodes
            .values()
            .filter(|node| {
                node.kind == pod_kind
                    && node.namespace.as_deref() == Some(placeholder.namespace.as_str())
                    && labels_match(&placeholder.selector, &node.labels)
            })
            .collect();

        if matches.is_empty() {
            tracing::debug!(
                "Selector on {} matched no pods in namespace {}",
                placeholder.source_id,
                placeholder.namespace
            );
            continue;
        }

        for target in matches {
            resolved.push(Edge {
                id: Edge::derive_id(&placeholder.source_id, &target.id, placeholder.relationship),
                source: placeholder.source_id.clone(),
                target: target.id.clone(),
                relationship: placeholder.relationship,
                strength: EdgeStrength::Strong,
                metadata: EdgeMetadata {
                    field: placeholder.field.clone(),
                    reason: format!("selector matches pod {}", target.name),
                },
            });
        }
    }

    let mut added = 0;
    for edge in resolved {
        if graph.add_edge(edge) {
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_labels_match_exact() {
        let selector = labels(&[("app", "x")]);
        assert!(labels_match(&selector, &labels(&[("app", "x"), ("tier", "web")])));
    }

    #[test]
    fn test_labels_match_value_mismatch() {
        let selector = labels(&[("app", "x")]);
        assert!(!labels_match(&selector, &labels(&[("app", "y")])));
    }

    #[test]
    fn test_labels_match_missing_key() {
        let selector = labels(&[("app", "x"), ("tier", "web")]);
        assert!(!labels_match(&selector, &labels(&[("app", "x")])));
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        // Callers never build empty placeholders, but the predicate itself
        // is vacuously true
        let selector = BTreeMap::new();
        assert!(labels_match(&selector, &labels(&[("a", "b")])));
    }
}
