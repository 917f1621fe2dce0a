//! Custom-resource-definition schema analysis

pub mod analyzer;
pub mod catalog;

pub use analyzer::{
    AnalyzerOptions, ApiGroupInfo, CrdSummary, SchemaAnalysis, SchemaReference, analyze_crds,
    api_group_inventory,
};
