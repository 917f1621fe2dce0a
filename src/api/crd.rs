//! CRD schema analysis endpoints

use crate::api::{ApiError, AppState};
use crate::crd::AnalyzerOptions;
use crate::export::{self, ExportFormat};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedParams {
    /// Comma-separated API group filter
    pub api_groups: Option<String>,
    #[serde(rename = "maxCRDs")]
    pub max_crds: Option<usize>,
    pub include_native: Option<bool>,
    pub depth: Option<usize>,
}

impl EnhancedParams {
    fn to_options(&self, state: &AppState) -> AnalyzerOptions {
        AnalyzerOptions {
            api_groups: self
                .api_groups
                .as_deref()
                .map(|groups| {
                    groups
                        .split(',')
                        .map(|g| g.trim().to_string())
                        .filter(|g| !g.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            max_crds: self.max_crds.unwrap_or(state.config.limits.max_crds),
            include_native: self.include_native.unwrap_or(true),
            max_depth: self.depth.unwrap_or(state.config.limits.schema_max_depth),
        }
    }
}

/// GET /dependencies/crd/enhanced?apiGroups=&maxCRDs=&includeNative=&depth=
/// Schema-relationship graph for custom resource definitions
pub async fn get_enhanced(
    State(state): State<AppState>,
    Query(params): Query<EnhancedParams>,
) -> Result<Json<Value>, ApiError> {
    let options = params.to_options(&state);
    debug!(
        "CRD analysis requested (groups: {:?}, maxCrds: {}, depth: {})",
        options.api_groups, options.max_crds, options.max_depth
    );

    let analysis = state
        .service
        .crd_graph(options, true)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "graph": export::render_graph_json(&analysis.graph),
        "crds": analysis.crds,
        "statistics": export::crd_statistics(&analysis),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdExportParams {
    pub format: Option<String>,
    pub api_groups: Option<String>,
    #[serde(rename = "maxCRDs")]
    pub max_crds: Option<usize>,
    #[serde(default)]
    pub include_raw_graph: bool,
    #[serde(default)]
    pub include_schema_details: bool,
}

/// GET /dependencies/crd/export?format=&includeRawGraph=&includeSchemaDetails=
/// CRD analysis export with statistics and per-group summaries
pub async fn export_analysis(
    State(state): State<AppState>,
    Query(params): Query<CrdExportParams>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = params
        .format
        .as_deref()
        .unwrap_or("json")
        .parse()
        .map_err(ApiError::BadRequest)?;

    let options = AnalyzerOptions {
        api_groups: params
            .api_groups
            .as_deref()
            .map(|groups| {
                groups
                    .split(',')
                    .map(|g| g.trim().to_string())
                    .filter(|g| !g.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        max_crds: params.max_crds.unwrap_or(state.config.limits.max_crds),
        include_native: true,
        max_depth: state.config.limits.schema_max_depth,
    };

    let analysis = state
        .service
        .crd_graph(options, false)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let diagram = state.config.diagram.to_diagram_limits();
    let body = export::render_crd_analysis(
        &analysis,
        format,
        params.include_raw_graph,
        params.include_schema_details,
        &diagram,
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    let filename = export::export_filename("crd-analysis", format);
    debug!("Exporting CRD analysis as {} ({} bytes)", filename, body.len());

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

/// GET /dependencies/crd/apigroups
/// Inventory of API groups and their CRD counts/versions
pub async fn get_api_groups(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let groups = state
        .service
        .api_groups()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let total = groups.len();
    Ok(Json(json!({
        "apiGroups": groups,
        "totalGroups": total,
    })))
}
