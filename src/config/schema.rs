//! Configuration schema definitions
//!
//! Defines the structure of the configuration file using serde for
//! serialization. Every performance-governor bound is overridable here.

use crate::export::DiagramLimits;
use crate::graph::builder::GraphLimits;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Performance governor bounds
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Report diagram size budget
    #[serde(default)]
    pub diagram: DiagramConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Bind address for the HTTP listener
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Performance governor bounds, all overridable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LimitsConfig {
    /// Max resources considered per resource type
    #[serde(default = "default_max_resources_per_type")]
    pub max_resources_per_type: usize,

    /// Max namespaces sampled for instance enumeration
    #[serde(default = "default_max_namespaces")]
    pub max_namespaces: usize,

    /// Max nodes included for cluster-scoped kinds
    #[serde(default = "default_max_cluster_scoped_nodes")]
    pub max_cluster_scoped_nodes: usize,

    /// Max synthesized reverse edges per computation
    #[serde(default = "default_max_reverse_edges")]
    pub max_reverse_edges: usize,

    /// Wall-clock budget for the resource-processing loop, in milliseconds
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Max custom resource definitions analyzed per computation
    #[serde(default = "default_max_crds")]
    pub max_crds: usize,

    /// Recursion ceiling for the CRD schema walk
    #[serde(default = "default_schema_max_depth")]
    pub schema_max_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_resources_per_type: default_max_resources_per_type(),
            max_namespaces: default_max_namespaces(),
            max_cluster_scoped_nodes: default_max_cluster_scoped_nodes(),
            max_reverse_edges: default_max_reverse_edges(),
            deadline_ms: default_deadline_ms(),
            max_crds: default_max_crds(),
            schema_max_depth: default_schema_max_depth(),
        }
    }
}

impl LimitsConfig {
    /// Convert to the assembler's limit struct
    pub fn to_graph_limits(&self) -> GraphLimits {
        GraphLimits {
            max_resources_per_type: self.max_resources_per_type,
            max_namespaces: self.max_namespaces,
            max_cluster_scoped_nodes: self.max_cluster_scoped_nodes,
            max_reverse_edges: self.max_reverse_edges,
            deadline: Duration::from_millis(self.deadline_ms),
            max_nodes: None,
        }
    }
}

/// Diagram size budget for the Markdown report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagramConfig {
    /// Max nodes drawn, most-connected first
    #[serde(default = "default_diagram_max_nodes")]
    pub max_nodes: usize,

    /// Max edges drawn among the selected nodes
    #[serde(default = "default_diagram_max_edges")]
    pub max_edges: usize,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            max_nodes: default_diagram_max_nodes(),
            max_edges: default_diagram_max_edges(),
        }
    }
}

impl DiagramConfig {
    pub fn to_diagram_limits(&self) -> DiagramLimits {
        DiagramLimits {
            max_nodes: self.max_nodes,
            max_edges: self.max_edges,
        }
    }
}

// Default value functions
fn default_bind() -> String {
    "0.0.0.0:8087".to_string()
}

fn default_max_resources_per_type() -> usize {
    200
}

fn default_max_namespaces() -> usize {
    10
}

fn default_max_cluster_scoped_nodes() -> usize {
    50
}

fn default_max_reverse_edges() -> usize {
    50
}

fn default_deadline_ms() -> u64 {
    10_000
}

fn default_max_crds() -> usize {
    30
}

fn default_schema_max_depth() -> usize {
    10
}

fn default_diagram_max_nodes() -> usize {
    25
}

fn default_diagram_max_edges() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.limits.max_reverse_edges, 50);
        assert_eq!(config.limits.schema_max_depth, 10);
        assert_eq!(config.diagram.max_nodes, 25);
        assert_eq!(config.diagram.max_edges, 50);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("limits:\n  maxReverseEdges: 5\n").unwrap();
        assert_eq!(config.limits.max_reverse_edges, 5);
        assert_eq!(config.limits.max_crds, 30);
        assert_eq!(config.server.bind, "0.0.0.0:8087");
    }
}
