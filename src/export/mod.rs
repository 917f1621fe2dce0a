//! Graph export rendering
//!
//! Three renderers share one canonical graph input: structured JSON, a
//! two-section tabular CSV, and a readable Markdown report embedding a
//! size-limited diagram. Metadata counts always describe the canonical
//! graph, before any format-specific size limiting.

pub mod diagram;

use crate::crd::analyzer::SchemaAnalysis;
use crate::graph::model::{DependencyGraph, EdgeStrength};
use anyhow::Result;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use diagram::{DiagramLimits, render_mermaid};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "markdown",
        }
    }

    /// File extension for the Content-Disposition filename
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Markdown => "text/markdown",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            other => Err(format!("Unsupported export format: {}", other)),
        }
    }
}

/// Timestamped filename for export downloads
pub fn export_filename(prefix: &str, format: ExportFormat) -> String {
    let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    format!("{}-{}.{}", prefix, stamp, format.extension())
}

/// Render the canonical graph in the requested format
pub fn render_graph(graph: &DependencyGraph, format: ExportFormat, diagram: &DiagramLimits) -> Result<String> {
    match format {
        ExportFormat::Json => {
            let value = render_graph_json(graph);
            Ok(serde_json::to_string_pretty(&value)?)
        }
        ExportFormat::Csv => Ok(render_graph_csv(graph)),
        ExportFormat::Markdown => Ok(render_graph_markdown(graph, diagram)),
    }
}

/// Structured rendering: the graph verbatim plus its metadata
pub fn render_graph_json(graph: &DependencyGraph) -> Value {
    json!({
        "nodes": graph.sorted_nodes(),
        "edges": graph.sorted_edges(),
        "metadata": graph.metadata,
    })
}

/// Tabular rendering: a nodes section and an edges section
pub fn render_graph_csv(graph: &DependencyGraph) -> String {
    let mut out = String::new();

    out.push_str("# Nodes\n");
    out.push_str("id,kind,name,namespace,labels,creationTimestamp\n");
    for node in graph.sorted_nodes() {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            csv_escape(&node.id),
            csv_escape(&node.kind),
            csv_escape(&node.name),
            csv_escape(node.namespace.as_deref().unwrap_or("")),
            node.labels.len(),
            csv_escape(node.creation_timestamp.as_deref().unwrap_or("")),
        ));
    }

    out.push_str("\n# Edges\n");
    out.push_str("source,target,type,strength,reason\n");
    for edge in graph.sorted_edges() {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_escape(&edge.source),
            csv_escape(&edge.target),
            edge.relationship.as_str(),
            edge.strength.as_str(),
            csv_escape(&edge.metadata.reason),
        ));
    }

    out
}

/// Report rendering: prose summary, statistics, and the embedded diagram
pub fn render_graph_markdown(graph: &DependencyGraph, diagram: &DiagramLimits) -> String {
    let meta = &graph.metadata;
    let mut out = String::new();

    out.push_str("# Dependency Graph Report\n\n");
    let scope = meta
        .namespace
        .as_deref()
        .map(|ns| format!("namespace `{}`", ns))
        .unwrap_or_else(|| "the whole cluster".to_string());
    out.push_str(&format!(
        "Computed over {} at {}: {} resources and {} relationships.\n\n",
        scope, meta.generated_at, meta.node_count, meta.edge_count
    ));
    if meta.truncated {
        out.push_str("> Partial result: processing stopped at a configured limit, so this graph covers less than the full cluster state.\n\n");
    }

    out.push_str("## Resources by kind\n\n");
    out.push_str("| Kind | Count |\n|---|---|\n");
    for (kind, count) in count_by(graph.sorted_nodes().iter().map(|n| n.kind.as_str())) {
        out.push_str(&format!("| {} | {} |\n", kind, count));
    }

    out.push_str("\n## Relationships by type\n\n");
    out.push_str("| Type | Count |\n|---|---|\n");
    for (rel, count) in count_by(
        graph
            .sorted_edges()
            .iter()
            .map(|e| e.relationship.as_str()),
    ) {
        let glyph = graph
            .sorted_edges()
            .iter()
            .find(|e| e.relationship.as_str() == rel)
            .map(|e| e.relationship.glyph())
            .unwrap_or("");
        out.push_str(&format!("| {} {} | {} |\n", glyph, rel, count));
    }

    out.push_str("\n## Diagram\n\n");
    out.push_str(&render_mermaid(graph, diagram));
    out
}

/// Render a CRD schema analysis in the requested format
pub fn render_crd_analysis(
    analysis: &SchemaAnalysis,
    format: ExportFormat,
    include_raw_graph: bool,
    include_schema_details: bool,
    diagram: &DiagramLimits,
) -> Result<String> {
    match format {
        ExportFormat::Json => {
            let value = render_crd_json(analysis, include_raw_graph, include_schema_details);
            Ok(serde_json::to_string_pretty(&value)?)
        }
        ExportFormat::Csv => Ok(render_crd_csv(analysis, include_schema_details)),
        ExportFormat::Markdown => Ok(render_crd_markdown(analysis, include_schema_details, diagram)),
    }
}

/// Statistics block shared by the CRD renderers
pub fn crd_statistics(analysis: &SchemaAnalysis) -> Value {
    let total_references: usize = analysis.crds.iter().map(|c| c.references.len()).sum();
    let strong: usize = analysis
        .crds
        .iter()
        .flat_map(|c| &c.references)
        .filter(|r| r.strength == EdgeStrength::Strong)
        .count();

    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for crd in &analysis.crds {
        *groups.entry(crd.group.as_str()).or_insert(0) += 1;
    }

    json!({
        "analyzedCrds": analysis.crds.len(),
        "skippedCrds": analysis.skipped,
        "totalReferences": total_references,
        "strongReferences": strong,
        "weakReferences": total_references - strong,
        "apiGroups": groups,
        "nodeCount": analysis.graph.metadata.node_count,
        "edgeCount": analysis.graph.metadata.edge_count,
    })
}

fn render_crd_json(analysis: &SchemaAnalysis, include_raw_graph: bool, include_schema_details: bool) -> Value {
    let crds: Vec<Value> = analysis
        .crds
        .iter()
        .map(|crd| {
            let mut entry = json!({
                "name": crd.name,
                "kind": crd.kind,
                "group": crd.group,
                "versions": crd.versions,
                "scope": crd.scope,
                "referenceCount": crd.references.len(),
            });
            if include_schema_details {
                entry["references"] = serde_json::to_value(&crd.references).unwrap_or(Value::Null);
            }
            entry
        })
        .collect();

    let mut out = json!({
        "statistics": crd_statistics(analysis),
        "crds": crds,
    });
    if include_raw_graph {
        out["graph"] = render_graph_json(&analysis.graph);
    }
    out
}

fn render_crd_csv(analysis: &SchemaAnalysis, include_schema_details: bool) -> String {
    let mut out = String::new();

    out.push_str("# CRDs\n");
    out.push_str("name,kind,group,versions,scope,referenceCount\n");
    for crd in &analysis.crds {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            csv_escape(&crd.name),
            csv_escape(&crd.kind),
            csv_escape(&crd.group),
            csv_escape(&crd.versions.join(";")),
            crd.scope,
            crd.references.len(),
        ));
    }

    if include_schema_details {
        out.push_str("\n# References\n");
        out.push_str("crd,fieldPath,kind,strength,reason\n");
        for crd in &analysis.crds {
            for reference in &crd.references {
                out.push_str(&format!(
                    "{},{},{},{},{}\n",
                    csv_escape(&crd.name),
                    csv_escape(&reference.field_path),
                    csv_escape(&reference.kind),
                    match reference.strength {
                        EdgeStrength::Strong => "strong",
                        EdgeStrength::Weak => "weak",
                    },
                    csv_escape(&reference.reason),
                ));
            }
        }
    }

    out
}

fn render_crd_markdown(analysis: &SchemaAnalysis, include_schema_details: bool, diagram: &DiagramLimits) -> String {
    let mut out = String::new();

    out.push_str("# CRD Schema Relationship Report\n\n");
    out.push_str(&format!(
        "Analyzed {} custom resource definitions ({} skipped by cap): {} schema relationships discovered.\n\n",
        analysis.crds.len(),
        analysis.skipped,
        analysis.graph.metadata.edge_count
    ));

    out.push_str("## Definitions by API group\n\n");
    out.push_str("| Group | CRDs |\n|---|---|\n");
    for (group, count) in count_by(analysis.crds.iter().map(|c| c.group.as_str())) {
        out.push_str(&format!("| {} | {} |\n", group, count));
    }

    if include_schema_details {
        out.push_str("\n## Discovered references\n\n");
        out.push_str("| CRD | Field | Kind | Strength |\n|---|---|---|---|\n");
        for crd in &analysis.crds {
            for reference in &crd.references {
                out.push_str(&format!(
                    "| {} | `{}` | {} | {} |\n",
                    crd.kind,
                    reference.field_path,
                    reference.kind,
                    match reference.strength {
                        EdgeStrength::Strong => "strong",
                        EdgeStrength::Weak => "weak",
                    },
                ));
            }
        }
    }

    out.push_str("\n## Diagram\n\n");
    out.push_str(&render_mermaid(&analysis.graph, diagram));
    out
}

/// Count occurrences preserving a sorted, deterministic order
fn count_by<'a>(items: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(item.to_string()).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// Quote a CSV field when it contains a delimiter, quote, or newline
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
