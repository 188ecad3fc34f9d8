//! Session export endpoint.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::error::Result;
use crate::export::export_session;
use crate::server::AppState;

use super::sessions::find_session;

/// GET /api/export/{id} - Download the session as a ZIP bundle
#[tracing::instrument(name = "http.export_session", skip(state))]
pub async fn download_export(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let session = find_session(&state, &id)?;
    let archive = export_session(session).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", archive.filename),
            ),
        ],
        archive.bytes,
    ))
}
