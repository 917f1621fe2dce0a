//! Resource dependency endpoints

use crate::api::{ApiError, AppState};
use crate::export::{self, ExportFormat};
use crate::models::KnownKind;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceParams {
    pub namespace: Option<String>,
}

/// GET /dependencies/:kind/:name?namespace=
/// Single-resource relationship report
pub async fn get_resource_dependencies(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
    Query(params): Query<ResourceParams>,
) -> Result<Json<Value>, ApiError> {
    if KnownKind::from_str_case_insensitive(&kind).is_none() {
        return Err(ApiError::BadRequest(format!(
            "Unknown resource kind: {}",
            kind
        )));
    }

    let namespace = params.namespace.as_deref().unwrap_or("default");
    debug!("Resource report requested for {}/{} in {}", kind, name, namespace);

    let report = state
        .service
        .resource_report(&kind, &name, Some(namespace))
        .await
        .map_err(|e| ApiError::NotFound(e.to_string()))?;

    serde_json::to_value(&report)
        .map(Json)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphParams {
    pub namespace: Option<String>,
    #[serde(default)]
    pub include_custom: bool,
    pub max_nodes: Option<usize>,
}

/// GET /dependencies/graph?namespace=&includeCustom=&maxNodes=
/// Canonical graph for a namespace or the whole cluster
pub async fn get_graph(
    State(state): State<AppState>,
    Query(params): Query<GraphParams>,
) -> Result<Json<Value>, ApiError> {
    debug!(
        "Graph requested (namespace: {:?}, includeCustom: {}, maxNodes: {:?})",
        params.namespace, params.include_custom, params.max_nodes
    );

    let namespace = params
        .namespace
        .or_else(crate::kube::get_default_namespace);
    let graph = state
        .service
        .namespace_graph(namespace.as_deref(), params.include_custom, params.max_nodes)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(export::render_graph_json(&graph)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportParams {
    pub format: Option<String>,
    pub namespace: Option<String>,
    #[serde(default)]
    pub include_custom: bool,
    pub max_nodes: Option<usize>,
}

/// GET /dependencies/graph/export?format=json|csv|markdown&...filters
/// Rendered export; Content-Disposition names the file by timestamp
pub async fn export_graph(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = params
        .format
        .as_deref()
        .unwrap_or("json")
        .parse()
        .map_err(ApiError::BadRequest)?;

    let namespace = params
        .namespace
        .or_else(crate::kube::get_default_namespace);
    let graph = state
        .service
        .namespace_graph(namespace.as_deref(), params.include_custom, params.max_nodes)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let diagram = state.config.diagram.to_diagram_limits();
    let body = export::render_graph(&graph, format, &diagram)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let filename = export::export_filename("dependency-graph", format);
    debug!("Exporting graph as {} ({} bytes)", filename, body.len());

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
