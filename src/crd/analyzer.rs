//! Schema relationship analysis for custom resource definitions
//!
//! Walks CRD OpenAPI schemas to infer field-level references to well-known
//! core kinds and schema-to-schema relationships between CRDs. The walk is
//! depth-bounded: input schemas are never trusted to be acyclic.

use crate::crd::catalog;
use crate::graph::model::{
    DependencyGraph, Edge, EdgeMetadata, EdgeStrength, GraphMetadata, Node, RelationshipType,
};
use crate::models::KnownKind;
use serde_json::Value;
use std::collections::BTreeMap;

/// Options governing one schema analysis
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Restrict analysis to these API groups (empty = all groups)
    pub api_groups: Vec<String>,
    /// Max CRDs analyzed per computation
    pub max_crds: usize,
    /// Include nodes for well-known core kinds referenced by CRD schemas
    pub include_native: bool,
    /// Recursion ceiling for the schema walk
    pub max_depth: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            api_groups: Vec::new(),
            max_crds: 30,
            include_native: true,
            max_depth: 10,
        }
    }
}

/// A field-level reference discovered in a CRD schema
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReference {
    /// Dotted path of the referencing field within the schema
    pub field_path: String,
    /// The referenced kind
    pub kind: String,
    /// Strong for a field-name match, weak for a description-only mention
    pub strength: EdgeStrength,
    pub reason: String,
}

/// Parsed summary of one CRD
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdSummary {
    /// Full CRD name, e.g. `certificates.cert-manager.io`
    pub name: String,
    /// The kind the CRD defines
    pub kind: String,
    pub group: String,
    /// Plural resource name, used for dynamic instance listings
    pub plural: String,
    /// Served version names
    pub versions: Vec<String>,
    /// `Namespaced` or `Cluster`
    pub scope: String,
    /// References discovered across all served versions
    pub references: Vec<SchemaReference>,
}

/// Result of one schema analysis: the schema graph plus per-CRD summaries
#[derive(Debug, Clone)]
pub struct SchemaAnalysis {
    pub graph: DependencyGraph,
    pub crds: Vec<CrdSummary>,
    /// CRDs skipped by the `max_crds` cap
    pub skipped: usize,
}

/// Inventory entry for the API-group listing
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroupInfo {
    pub group: String,
    pub crd_count: usize,
    pub kinds: Vec<String>,
    pub versions: Vec<String>,
}

/// Analyze a set of CRD documents into a schema relationship graph.
///
/// Instance nodes never appear here: every node represents a kind, with
/// labels encoding its API group, served versions, and scope.
pub fn analyze_crds(crds: &[Value], options: &AnalyzerOptions) -> SchemaAnalysis {
    // Parse and filter first so the cap applies to the filtered set
    let mut parsed: Vec<(CrdSummary, &Value)> = Vec::new();
    for crd in crds {
        match parse_crd(crd) {
            Some(summary) => {
                if !options.api_groups.is_empty()
                    && !options.api_groups.iter().any(|g| g == &summary.group)
                {
                    continue;
                }
                parsed.push((summary, crd));
            }
            None => {
                tracing::warn!("Skipping CRD with unexpected shape");
            }
        }
    }

    let skipped = parsed.len().saturating_sub(options.max_crds);
    if skipped > 0 {
        tracing::debug!("CRD cap of {} reached, skipping {} definitions", options.max_crds, skipped);
    }
    parsed.truncate(options.max_crds);

    // Candidate kinds the walk should look for: the core catalog plus every
    // CRD kind under analysis (enables CRD-to-CRD inference in one pass)
    let crd_kinds: Vec<String> = parsed.iter().map(|(s, _)| s.kind.clone()).collect();
    let mut candidates: Vec<String> = KnownKind::all().iter().map(|k| k.as_str().to_string()).collect();
    candidates.extend(crd_kinds.iter().cloned());

    let mut summaries: Vec<CrdSummary> = Vec::new();
    for (mut summary, crd) in parsed {
        summary.references = collect_references(crd, &summary, &candidates, options.max_depth);
        summaries.push(summary);
    }

    let graph = build_schema_graph(&summaries, crds, options);

    SchemaAnalysis {
        graph,
        crds: summaries,
        skipped,
    }
}

/// Build the API-group inventory from raw CRD documents
pub fn api_group_inventory(crds: &[Value]) -> Vec<ApiGroupInfo> {
    let mut groups: BTreeMap<String, ApiGroupInfo> = BTreeMap::new();

    for crd in crds {
        let Some(summary) = parse_crd(crd) else {
            continue;
        };
        let entry = groups.entry(summary.group.clone()).or_insert_with(|| ApiGroupInfo {
            group: summary.group.clone(),
            crd_count: 0,
            kinds: Vec::new(),
            versions: Vec::new(),
        });
        entry.crd_count += 1;
        entry.kinds.push(summary.kind);
        for version in summary.versions {
            if !entry.versions.contains(&version) {
                entry.versions.push(version);
            }
        }
    }

    groups.into_values().collect()
}

/// Parse the identifying fields of a CRD document
fn parse_crd(crd: &Value) -> Option<CrdSummary> {
    let spec = crd.get("spec")?;
    let name = crd
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str())?
        .to_string();
    let group = spec.get("group").and_then(|g| g.as_str())?.to_string();
    let kind = spec
        .get("names")
        .and_then(|n| n.get("kind"))
        .and_then(|k| k.as_str())?
        .to_string();
    let plural = spec
        .get("names")
        .and_then(|n| n.get("plural"))
        .and_then(|p| p.as_str())
        .unwrap_or_default()
        .to_string();
    let scope = spec
        .get("scope")
        .and_then(|s| s.as_str())
        .unwrap_or("Namespaced")
        .to_string();

    let versions = spec
        .get("versions")
        .and_then(|v| v.as_array())
        .map(|versions| {
            versions
                .iter()
                .filter(|v| v.get("served").and_then(|s| s.as_bool()).unwrap_or(false))
                .filter_map(|v| v.get("name").and_then(|n| n.as_str()))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    Some(CrdSummary {
        name,
        kind,
        group,
        plural,
        versions,
        scope,
        references: Vec::new(),
    })
}

/// Collect references across every served version's schema
fn collect_references(
    crd: &Value,
    summary: &CrdSummary,
    candidates: &[String],
    max_depth: usize,
) -> Vec<SchemaReference> {
    let mut references = Vec::new();

    let Some(versions) = crd
        .get("spec")
        .and_then(|s| s.get("versions"))
        .and_then(|v| v.as_array())
    else {
        return references;
    };

    for version in versions {
        if !version.get("served").and_then(|s| s.as_bool()).unwrap_or(false) {
            continue;
        }
        let Some(schema) = version
            .get("schema")
            .and_then(|s| s.get("openAPIV3Schema"))
        else {
            continue;
        };

        walk_schema(schema, "", 0, max_depth, summary, candidates, &mut references);
    }

    // Duplicate discoveries across versions collapse to one reference
    references.sort_by(|a, b| (&a.field_path, &a.kind).cmp(&(&b.field_path, &b.kind)));
    references.dedup_by(|a, b| a.field_path == b.field_path && a.kind == b.kind);
    references
}

/// Depth-bounded recursive schema walk.
///
/// The ceiling guards against self-referential schema structures; no
/// property beyond `max_depth` is visited regardless of input shape.
fn walk_schema(
    schema: &Value,
    path: &str,
    depth: usize,
    max_depth: usize,
    summary: &CrdSummary,
    candidates: &[String],
    out: &mut Vec<SchemaReference>,
) {
    if depth >= max_depth {
        return;
    }

    if let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) {
        for (field_name, field_schema) in properties {
            let field_path = if path.is_empty() {
                field_name.clone()
            } else {
                format!("{}.{}", path, field_name)
            };

            let description = field_schema
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("");

            for kind in candidates {
                // A CRD referencing its own kind is a recursion artifact,
                // not a relationship
                if *kind == summary.kind {
                    continue;
                }

                if catalog::field_references_kind(field_name, kind) {
                    out.push(SchemaReference {
                        field_path: field_path.clone(),
                        kind: kind.clone(),
                        strength: EdgeStrength::Strong,
                        reason: format!("field {} names kind {}", field_name, kind),
                    });
                } else if catalog::text_mentions_kind(description, kind) {
                    out.push(SchemaReference {
                        field_path: field_path.clone(),
                        kind: kind.clone(),
                        strength: EdgeStrength::Weak,
                        reason: format!("description mentions kind {}", kind),
                    });
                }
            }

            walk_schema(field_schema, &field_path, depth + 1, max_depth, summary, candidates, out);
        }
    }

    if let Some(items) = schema.get("items") {
        walk_schema(items, &format!("{}[]", path), depth + 1, max_depth, summary, candidates, out);
    }

    if let Some(additional) = schema.get("additionalProperties") {
        if additional.is_object() {
            walk_schema(additional, &format!("{}.*", path), depth + 1, max_depth, summary, candidates, out);
        }
    }
}

/// Assemble the schema graph: one node per analyzed CRD kind, plus native
/// kind nodes when requested, plus reference and mention edges
fn build_schema_graph(
    summaries: &[CrdSummary],
    raw_crds: &[Value],
    options: &AnalyzerOptions,
) -> DependencyGraph {
    let mut graph = DependencyGraph::new();

    for summary in summaries {
        graph.add_node(schema_node(summary));
    }

    for summary in summaries {
        let source_id = Node::derive_id(&summary.kind, &summary.kind, None);

        for reference in &summary.references {
            let is_native = KnownKind::parse_optional(&reference.kind).is_some();
            if is_native && !options.include_native {
                continue;
            }

            let target_id = Node::derive_id(&reference.kind, &reference.kind, None);
            if !graph.contains_node(&target_id) {
                if is_native {
                    graph.add_node(native_kind_node(&reference.kind));
                } else {
                    continue;
                }
            }

            let relationship = if is_native {
                catalog::relationship_for_kind(&reference.kind)
            } else {
                RelationshipType::Custom
            };

            graph.add_edge(Edge {
                id: Edge::derive_id(&source_id, &target_id, relationship),
                source: source_id.clone(),
                target: target_id,
                relationship,
                strength: reference.strength,
                metadata: EdgeMetadata {
                    field: reference.field_path.clone(),
                    reason: reference.reason.clone(),
                },
            });
        }
    }

    // CRD-to-CRD mention pass: a serialized-schema substring search catches
    // relationships the field walk cannot see. Best-effort and always weak.
    for (idx, summary) in summaries.iter().enumerate() {
        let Some(raw) = raw_crds.iter().find(|c| {
            c.get("metadata")
                .and_then(|m| m.get("name"))
                .and_then(|n| n.as_str())
                == Some(summary.name.as_str())
        }) else {
            continue;
        };
        let serialized = raw
            .get("spec")
            .map(|s| s.to_string().to_lowercase())
            .unwrap_or_default();

        for (other_idx, other) in summaries.iter().enumerate() {
            if idx == other_idx {
                continue;
            }
            let source_id = Node::derive_id(&summary.kind, &summary.kind, None);
            let target_id = Node::derive_id(&other.kind, &other.kind, None);
            let edge_id = Edge::derive_id(&source_id, &target_id, RelationshipType::Custom);
            if graph.edges.contains_key(&edge_id) {
                continue;
            }

            let mentioned = serialized.contains(&other.kind.to_lowercase())
                || serialized.contains(&other.name.to_lowercase())
                || (!other.group.is_empty() && serialized.contains(&other.group.to_lowercase()));
            if !mentioned {
                continue;
            }

            graph.add_edge(Edge {
                id: edge_id,
                source: source_id,
                target: target_id,
                relationship: RelationshipType::Custom,
                strength: EdgeStrength::Weak,
                metadata: EdgeMetadata {
                    field: "schema".to_string(),
                    reason: format!("schema mentions {}", other.kind),
                },
            });
        }
    }

    graph.metadata = GraphMetadata {
        node_count: 0,
        edge_count: 0,
        generated_at: chrono::Utc::now().to_rfc3339(),
        namespace: None,
        include_custom: true,
        truncated: false,
    };
    graph.finalize_counts();
    graph
}

/// Node for an analyzed CRD kind: labels encode group, versions, and scope
fn schema_node(summary: &CrdSummary) -> Node {
    let mut labels = BTreeMap::new();
    labels.insert("apiGroup".to_string(), summary.group.clone());
    labels.insert("versions".to_string(), summary.versions.join(","));
    labels.insert("scope".to_string(), summary.scope.clone());

    Node {
        id: Node::derive_id(&summary.kind, &summary.kind, None),
        kind: summary.kind.clone(),
        name: summary.name.clone(),
        namespace: None,
        labels,
        creation_timestamp: None,
        status: "Defined".to_string(),
    }
}

/// Node for a well-known core kind referenced from a CRD schema
fn native_kind_node(kind: &str) -> Node {
    let mut labels = BTreeMap::new();
    labels.insert(
        "apiGroup".to_string(),
        KnownKind::parse_optional(kind)
            .map(|k| k.api_group().to_string())
            .unwrap_or_default(),
    );
    labels.insert("native".to_string(), "true".to_string());

    Node {
        id: Node::derive_id(kind, kind, None),
        kind: kind.to_string(),
        name: kind.to_string(),
        namespace: None,
        labels,
        creation_timestamp: None,
        status: "Native".to_string(),
    }
}
