//! kubedeps library
//!
//! This library provides the core functionality for the kubedeps server:
//! relationship discovery among live cluster objects and CRD schemas, graph
//! assembly under time and size budgets, and multi-format export. It can be
//! used both as a binary and as a library for testing.

pub mod api;
pub mod cli;
pub mod config;
pub mod crd;
pub mod export;
pub mod graph;
pub mod kube;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use graph::{
    DependencyGraph, Edge, EdgeMetadata, EdgeStrength, GraphLimits, GraphMetadata, Node,
    RelationshipType, analyze_resource, assemble_graph,
};
pub use models::KnownKind;
