//! Dependency graph computation
//!
//! The pipeline: fetched resources flow through the rule engine
//! ([`rules`]), the assembler ([`builder`]) accumulates deduplicated nodes
//! and edges under the performance governor's limits, and the selector
//! resolver ([`selector`]) performs the second pass once all candidate
//! nodes are known.

pub mod builder;
pub mod model;
pub mod rules;
pub mod selector;

pub use builder::{GraphLimits, assemble_graph};
pub use model::{
    DependencyGraph, Edge, EdgeMetadata, EdgeStrength, GraphMetadata, Node, RelationshipType,
};
pub use rules::{CandidateEdge, CandidateRelations, SelectorPlaceholder, analyze_resource};
