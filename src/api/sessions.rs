//! Wizard session endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::session::{Session, SessionStats, SessionUpdate};

use super::extract::{parse_id, ApiJson};

pub(crate) const SESSION_NOT_FOUND: &str = "Сессия не найдена";

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Session by raw path id, or a 404
pub(crate) fn find_session(state: &AppState, raw_id: &str) -> Result<Session> {
    parse_id(raw_id)
        .and_then(|id| state.sessions.get(id))
        .ok_or_else(|| AppError::not_found(SESSION_NOT_FOUND))
}

/// POST /api/sessions - Start a new wizard session
#[tracing::instrument(name = "http.create_session", skip(state))]
pub async fn create_session(State(state): State<AppState>) -> Json<Session> {
    Json(state.sessions.create())
}

/// GET /api/sessions/{id}
#[tracing::instrument(name = "http.get_session", skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>> {
    find_session(&state, &id).map(Json)
}

/// PUT /api/sessions/{id} - Merge the provided fields into the session
#[tracing::instrument(name = "http.update_session", skip(state, update))]
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<SessionUpdate>,
) -> Result<Json<Session>> {
    let id = parse_id(&id).ok_or_else(|| AppError::not_found(SESSION_NOT_FOUND))?;
    let session = state.sessions.update(id, update)?;
    Ok(Json(session))
}

/// POST /api/sessions/{id}/reset - Start the wizard over
#[tracing::instrument(name = "http.reset_session", skip(state))]
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>> {
    let id = parse_id(&id).ok_or_else(|| AppError::not_found(SESSION_NOT_FOUND))?;
    let session = state.sessions.reset(id)?;
    Ok(Json(session))
}

/// DELETE /api/sessions/{id}
#[tracing::instrument(name = "http.delete_session", skip(state))]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = parse_id(&id).is_some_and(|id| state.sessions.delete(id));
    Json(DeleteResponse { deleted })
}

/// GET /api/stats - Session counters by step, category and goal
#[tracing::instrument(name = "http.session_stats", skip(state))]
pub async fn session_stats(State(state): State<AppState>) -> Json<SessionStats> {
    Json(state.sessions.stats())
}
