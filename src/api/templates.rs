//! Prompt template diagnostics.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::Result;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<String>,
    pub cached: usize,
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub cleared: usize,
}

/// GET /api/templates - Template names on disk and cache size
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Result<Json<TemplateListResponse>> {
    let templates = state.templates.list().await?;

    Ok(Json(TemplateListResponse {
        templates,
        cached: state.templates.cached_count(),
    }))
}

/// POST /api/templates/cache/clear - Drop every cached template
#[tracing::instrument(name = "http.clear_template_cache", skip(state))]
pub async fn clear_template_cache(State(state): State<AppState>) -> Json<CacheClearResponse> {
    let cleared = state.templates.invalidate_all();
    tracing::info!(cleared, "Template cache cleared");
    Json(CacheClearResponse { cleared })
}
