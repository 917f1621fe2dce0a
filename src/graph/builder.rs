//! Graph assembly with performance governance
//!
//! Takes already-fetched resource objects, runs them through the rule
//! engine, and accumulates a deduplicated node/edge graph. The assembler is
//! fully synchronous: all cluster fan-out happens before it runs.
//!
//! The performance governor is cooperative. The deadline is checked once
//! per resource in the main loop; when it expires the computation stops and
//! returns a partial graph marked `truncated` in its metadata - never an
//! error and never a malformed graph.

use crate::graph::model::{
    DependencyGraph, Edge, EdgeMetadata, GraphMetadata, Node, RelationshipType,
};
use crate::graph::rules::{self, CandidateEdge, SelectorPlaceholder};
use crate::graph::selector;
use crate::models::KnownKind;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

/// Relationship types eligible for reverse-edge synthesis: consumption-style
/// relationships where a "what consumes me" view is worth surfacing
const REVERSE_ELIGIBLE: &[RelationshipType] = &[
    RelationshipType::ConfigMap,
    RelationshipType::Secret,
    RelationshipType::ServiceAccount,
    RelationshipType::Environment,
];

/// Bounds applied during graph assembly, all overridable via configuration
#[derive(Debug, Clone)]
pub struct GraphLimits {
    /// Max resources considered per resource type
    pub max_resources_per_type: usize,
    /// Max namespaces sampled when enumerating instances cluster-wide
    pub max_namespaces: usize,
    /// Max nodes included for cluster-scoped kinds
    pub max_cluster_scoped_nodes: usize,
    /// Max synthesized reverse edges per computation
    pub max_reverse_edges: usize,
    /// Wall-clock budget for the resource-processing loop
    pub deadline: Duration,
    /// Optional overall node cap (from the `maxNodes` query parameter)
    pub max_nodes: Option<usize>,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_resources_per_type: 200,
            max_namespaces: 10,
            max_cluster_scoped_nodes: 50,
            max_reverse_edges: 50,
            deadline: Duration::from_secs(10),
            max_nodes: None,
        }
    }
}

/// Assemble the canonical dependency graph from fetched resource objects.
///
/// `namespace` is the scope filter recorded in metadata (None for a
/// cluster-wide computation) and the default namespace for objects whose
/// metadata omits one.
pub fn assemble_graph(
    resources: &[Value],
    namespace: Option<&str>,
    limits: &GraphLimits,
) -> DependencyGraph {
    let started = Instant::now();
    let default_ns = namespace.unwrap_or("");

    let mut graph = DependencyGraph::new();
    let mut pending_edges: Vec<(Node, Vec<CandidateEdge>)> = Vec::new();
    let mut placeholders: Vec<SelectorPlaceholder> = Vec::new();
    let mut per_type_counts: HashMap<String, usize> = HashMap::new();
    let mut cluster_scoped_count = 0usize;
    let mut truncated = false;

    // First pass: extract nodes and collect candidates. All nodes must be
    // known before edges and selectors are resolved, because discovery order
    // is unspecified.
    for obj in resources {
        if started.elapsed() >= limits.deadline {
            tracing::warn!(
                "Graph deadline of {:?} exceeded after {} nodes, returning partial graph",
                limits.deadline,
                graph.node_count()
            );
            truncated = true;
            break;
        }

        if let Some(max) = limits.max_nodes {
            if graph.node_count() >= max {
                truncated = true;
                break;
            }
        }

        let relations = match rules::analyze_resource(obj, default_ns) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Skipping unanalyzable object: {}", e);
                continue;
            }
        };
        // extract_node cannot fail if analyze_resource succeeded
        let Ok(node) = rules::extract_node(obj, default_ns) else {
            continue;
        };

        // Duplicate fetches of the same object collapse silently here
        if graph.contains_node(&node.id) {
            continue;
        }

        let type_count = per_type_counts.entry(node.kind.clone()).or_insert(0);
        if *type_count >= limits.max_resources_per_type {
            truncated = true;
            continue;
        }

        if node.namespace.is_none() {
            if cluster_scoped_count >= limits.max_cluster_scoped_nodes {
                truncated = true;
                continue;
            }
            cluster_scoped_count += 1;
        }

        *type_count += 1;
        graph.add_node(node.clone());
        pending_edges.push((node, relations.outgoing));
        placeholders.extend(relations.related);
    }

    // Second pass: canonicalize candidate edges now that real nodes exist.
    // Targets never fetched (capped listings, dangling references) get stub
    // nodes so every edge endpoint resolves.
    for (source, candidates) in &pending_edges {
        for candidate in candidates {
            let target_id = match resolve_target(&mut graph, source, candidate, limits) {
                Some(id) => id,
                None => {
                    truncated = true;
                    continue;
                }
            };

            graph.add_edge(Edge {
                id: Edge::derive_id(&source.id, &target_id, candidate.relationship),
                source: source.id.clone(),
                target: target_id,
                relationship: candidate.relationship,
                strength: candidate.strength,
                metadata: EdgeMetadata {
                    field: candidate.field.clone(),
                    reason: candidate.reason.clone(),
                },
            });
        }
    }

    let resolved = selector::resolve_selectors(&mut graph, &placeholders);
    tracing::debug!("Resolved {} selector edges from {} placeholders", resolved, placeholders.len());

    synthesize_reverse_edges(&mut graph, limits.max_reverse_edges);

    graph.metadata = GraphMetadata {
        node_count: 0,
        edge_count: 0,
        generated_at: chrono::Utc::now().to_rfc3339(),
        namespace: namespace.map(|s| s.to_string()),
        include_custom: false,
        truncated,
    };
    graph.finalize_counts();
    graph
}

/// Resolve a candidate's target to a node id, creating a stub node when the
/// target was never fetched. Returns None if the node cap forbids the stub.
fn resolve_target(
    graph: &mut DependencyGraph,
    source: &Node,
    candidate: &CandidateEdge,
    limits: &GraphLimits,
) -> Option<String> {
    let target_cluster_scoped = KnownKind::parse_optional(&candidate.target_kind)
        .map(|k| k.is_cluster_scoped())
        .unwrap_or(false);

    // A candidate without an explicit namespace inherits the source's,
    // unless the target kind is cluster-scoped
    let target_ns: Option<String> = if target_cluster_scoped {
        None
    } else {
        candidate
            .target_namespace
            .clone()
            .or_else(|| source.namespace.clone())
    };

    let target_id = Node::derive_id(&candidate.target_kind, &candidate.target_name, target_ns.as_deref());

    if !graph.contains_node(&target_id) {
        if let Some(max) = limits.max_nodes {
            if graph.node_count() >= max {
                return None;
            }
        }
        graph.add_node(Node {
            id: target_id.clone(),
            kind: candidate.target_kind.clone(),
            name: candidate.target_name.clone(),
            namespace: target_ns,
            labels: BTreeMap::new(),
            creation_timestamp: None,
            status: "Unknown".to_string(),
        });
    }

    Some(target_id)
}

/// Synthesize bounded reverse edges for consumption-style relationships.
///
/// Inverting forward edges already present avoids a full reverse scan over
/// all resources in commonly-large namespaces while still surfacing "what
/// consumes me" for provider kinds.
fn synthesize_reverse_edges(graph: &mut DependencyGraph, cap: usize) {
    let mut reverse: Vec<Edge> = Vec::new();

    // Sorted iteration keeps the synthesized subset deterministic under the cap
    for edge in graph.sorted_edges() {
        if reverse.len() >= cap {
            tracing::debug!("Reverse edge cap of {} reached", cap);
            break;
        }
        if !REVERSE_ELIGIBLE.contains(&edge.relationship) {
            continue;
        }
        reverse.push(Edge {
            id: Edge::derive_reverse_id(&edge.target, &edge.source, edge.relationship),
            source: edge.target.clone(),
            target: edge.source.clone(),
            relationship: edge.relationship,
            strength: edge.strength,
            metadata: EdgeMetadata {
                field: edge.metadata.field.clone(),
                reason: format!("consumed by {}", edge.source),
            },
        });
    }

    for edge in reverse {
        graph.add_edge(edge);
    }
}
