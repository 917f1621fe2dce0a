//! Graph data structures for resource relationships
//!
//! This module provides the canonical node/edge representation produced by
//! one dependency computation, independent of export format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A node in the dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier, derived as `<kind>/<name>[@<namespace>]`
    pub id: String,
    /// Resource kind
    pub kind: String,
    /// Resource name
    pub name: String,
    /// Resource namespace (None for cluster-scoped resources)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Resource labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Creation timestamp (RFC3339, as reported by the API server)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    /// Coarse status string ("Running", "Active", "Unknown", ...)
    pub status: String,
}

impl Node {
    /// Derive the canonical node id for a kind/name/namespace triple.
    ///
    /// Two fetches of the same object must produce the same id; this is the
    /// sole identity key for deduplication.
    pub fn derive_id(kind: &str, name: &str, namespace: Option<&str>) -> String {
        match namespace {
            Some(ns) if !ns.is_empty() => format!("{}/{}@{}", kind, name, ns),
            _ => format!("{}/{}", kind, name),
        }
    }
}

/// Type of relationship between nodes (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipType {
    Owner,
    Volume,
    ConfigMap,
    Secret,
    ServiceAccount,
    ImagePullSecret,
    Environment,
    Service,
    Network,
    Scheduling,
    Custom,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Owner => "owner",
            RelationshipType::Volume => "volume",
            RelationshipType::ConfigMap => "configMap",
            RelationshipType::Secret => "secret",
            RelationshipType::ServiceAccount => "serviceAccount",
            RelationshipType::ImagePullSecret => "imagePullSecret",
            RelationshipType::Environment => "environment",
            RelationshipType::Service => "service",
            RelationshipType::Network => "network",
            RelationshipType::Scheduling => "scheduling",
            RelationshipType::Custom => "custom",
        }
    }

    /// Glyph used by the report renderer; defined once, reused everywhere
    pub fn glyph(&self) -> &'static str {
        match self {
            RelationshipType::Owner => "◆",
            RelationshipType::Volume => "▣",
            RelationshipType::ConfigMap => "▤",
            RelationshipType::Secret => "◈",
            RelationshipType::ServiceAccount => "♙",
            RelationshipType::ImagePullSecret => "⬇",
            RelationshipType::Environment => "⚙",
            RelationshipType::Service => "⇄",
            RelationshipType::Network => "☍",
            RelationshipType::Scheduling => "⏱",
            RelationshipType::Custom => "✦",
        }
    }

    /// Hex color used by the report renderer
    pub fn color(&self) -> &'static str {
        match self {
            RelationshipType::Owner => "#d97706",
            RelationshipType::Volume => "#7c3aed",
            RelationshipType::ConfigMap => "#2563eb",
            RelationshipType::Secret => "#dc2626",
            RelationshipType::ServiceAccount => "#059669",
            RelationshipType::ImagePullSecret => "#b91c1c",
            RelationshipType::Environment => "#0891b2",
            RelationshipType::Service => "#4f46e5",
            RelationshipType::Network => "#9333ea",
            RelationshipType::Scheduling => "#ca8a04",
            RelationshipType::Custom => "#6b7280",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            RelationshipType::Owner,
            RelationshipType::Volume,
            RelationshipType::ConfigMap,
            RelationshipType::Secret,
            RelationshipType::ServiceAccount,
            RelationshipType::ImagePullSecret,
            RelationshipType::Environment,
            RelationshipType::Service,
            RelationshipType::Network,
            RelationshipType::Scheduling,
            RelationshipType::Custom,
        ]
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationshipType::all()
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown relationship type: {}", s))
    }
}

/// Strength of an inferred relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeStrength {
    /// Inferable from an explicit structural reference
    Strong,
    /// Heuristic or selector-based inference
    Weak,
}

impl EdgeStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeStrength::Strong => "strong",
            EdgeStrength::Weak => "weak",
        }
    }
}

/// Context attached to an edge: which field produced it and why
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMetadata {
    /// The field path the relationship was inferred from
    pub field: String,
    /// Human-readable reason for the edge
    pub reason: String,
}

/// An edge representing a relationship between nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Deduplication key, derived from (source, target, type)
    pub id: String,
    /// Source node id (the dependent resource)
    pub source: String,
    /// Target node id (the resource depended upon)
    pub target: String,
    /// Relationship type
    pub relationship: RelationshipType,
    /// Relationship strength
    pub strength: EdgeStrength,
    /// Provenance context
    pub metadata: EdgeMetadata,
}

impl Edge {
    /// Derive the canonical edge id for a (source, target, type) triple.
    pub fn derive_id(source: &str, target: &str, relationship: RelationshipType) -> String {
        format!("{}->{}:{}", source, target, relationship.as_str())
    }

    /// Derive the id for a synthesized reverse edge. The directional marker
    /// keeps an inverted edge distinct from a naturally-discovered forward
    /// edge between the same pair.
    pub fn derive_reverse_id(source: &str, target: &str, relationship: RelationshipType) -> String {
        format!("{}->{}:{}:reverse", source, target, relationship.as_str())
    }
}

/// Metadata describing one graph computation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    /// Number of nodes in the canonical graph
    pub node_count: usize,
    /// Number of edges in the canonical graph
    pub edge_count: usize,
    /// When the computation finished (RFC3339)
    pub generated_at: String,
    /// Namespace filter applied, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Whether custom resources were included
    #[serde(default)]
    pub include_custom: bool,
    /// Set when the performance governor stopped processing early.
    /// A truncated graph is still well-formed, just smaller than the cluster.
    #[serde(default)]
    pub truncated: bool,
}

/// The canonical deduplicated graph produced by one computation
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraph {
    /// Nodes keyed by derived id, serialized in sorted order
    #[serde(serialize_with = "ordered_nodes")]
    pub nodes: std::collections::HashMap<String, Node>,
    /// Edges keyed by derived id, serialized in sorted order
    #[serde(serialize_with = "ordered_edges")]
    pub edges: std::collections::HashMap<String, Edge>,
    /// Computation metadata
    pub metadata: GraphMetadata,
}

fn ordered_nodes<S>(
    nodes: &std::collections::HashMap<String, Node>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut sorted: Vec<&Node> = nodes.values().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    serializer.collect_seq(sorted)
}

fn ordered_edges<S>(
    edges: &std::collections::HashMap<String, Edge>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut sorted: Vec<&Edge> = edges.values().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    serializer.collect_seq(sorted)
}

impl DependencyGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph.
    ///
    /// Idempotent: a repeated id is a silent no-op (first-seen wins).
    /// Returns true if the node was inserted.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Add an edge to the graph.
    ///
    /// Idempotent: a repeated derived id is a silent no-op.
    /// Returns true if the edge was inserted.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if self.edges.contains_key(&edge.id) {
            return false;
        }
        self.edges.insert(edge.id.clone(), edge);
        true
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes sorted by id, for deterministic rendering
    pub fn sorted_nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// Edges sorted by id, for deterministic rendering
    pub fn sorted_edges(&self) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self.edges.values().collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));
        edges
    }

    /// Refresh the metadata counts from the current node/edge maps
    pub fn finalize_counts(&mut self) {
        self.metadata.node_count = self.nodes.len();
        self.metadata.edge_count = self.edges.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            kind: "Pod".to_string(),
            name: "p".to_string(),
            namespace: Some("default".to_string()),
            labels: BTreeMap::new(),
            creation_timestamp: None,
            status: "Running".to_string(),
        }
    }

    #[test]
    fn test_derive_node_id() {
        assert_eq!(Node::derive_id("Pod", "web", Some("default")), "Pod/web@default");
        assert_eq!(Node::derive_id("Node", "worker-1", None), "Node/worker-1");
        assert_eq!(Node::derive_id("Node", "worker-1", Some("")), "Node/worker-1");
    }

    #[test]
    fn test_add_node_first_seen_wins() {
        let mut graph = DependencyGraph::new();
        let mut first = node("Pod/p@default");
        first.status = "Running".to_string();
        let mut second = node("Pod/p@default");
        second.status = "Pending".to_string();

        assert!(graph.add_node(first));
        assert!(!graph.add_node(second));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes["Pod/p@default"].status, "Running");
    }

    #[test]
    fn test_add_edge_dedup() {
        let mut graph = DependencyGraph::new();
        let id = Edge::derive_id("a", "b", RelationshipType::ConfigMap);
        let edge = Edge {
            id: id.clone(),
            source: "a".to_string(),
            target: "b".to_string(),
            relationship: RelationshipType::ConfigMap,
            strength: EdgeStrength::Strong,
            metadata: EdgeMetadata {
                field: "spec.volumes".to_string(),
                reason: "volume mount".to_string(),
            },
        };

        assert!(graph.add_edge(edge.clone()));
        assert!(!graph.add_edge(edge));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_reverse_id_distinct_from_forward() {
        let forward = Edge::derive_id("a", "b", RelationshipType::Secret);
        let reverse = Edge::derive_reverse_id("b", "a", RelationshipType::Secret);
        assert_ne!(forward, reverse);
    }

    #[test]
    fn test_relationship_type_parse() {
        assert_eq!(
            "configMap".parse::<RelationshipType>().unwrap(),
            RelationshipType::ConfigMap
        );
        assert!("bogus".parse::<RelationshipType>().is_err());
    }
}
