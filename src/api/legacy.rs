//! Legacy idea analysis, plan and step endpoints.
//!
//! Responses are wrapped as `{"success": true, "data": ...}`.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::project::{Progress, ProjectError, Step};
use crate::server::AppState;

use super::extract::{non_blank, parse_id, ApiJson};

const MIN_IDEA_CHARS: usize = 20;
const MAX_IDEA_CHARS: usize = 2000;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeIdeaRequest {
    #[serde(default)]
    pub idea: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaAnalysisData {
    pub project_id: Uuid,
    pub problem: String,
    pub product_vision: String,
    pub key_features: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisionRequest {
    #[serde(default)]
    pub product_vision: Option<String>,
    #[serde(default)]
    pub key_features: Option<Vec<String>>,
    #[serde(default)]
    pub corrections: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionData {
    pub project_id: Uuid,
    pub product_vision: String,
    pub key_features: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanRequest {
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanData {
    pub project_id: Uuid,
    pub steps: Vec<Step>,
    pub total_steps: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPlanData {
    pub project_id: Uuid,
    pub product_vision: String,
    pub key_features: Vec<String>,
    pub steps: Vec<Step>,
    pub progress: Progress,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepsData {
    pub project_id: Uuid,
    pub steps: Vec<Step>,
    pub progress: Progress,
}

#[derive(Debug, Serialize)]
pub struct StepProgressData {
    pub step: Step,
    pub progress: Progress,
}

fn project_id(raw: &str) -> Result<Uuid> {
    parse_id(raw).ok_or_else(|| ProjectError::ProjectNotFound(Uuid::nil()).into())
}

fn step_id(raw: &str) -> Result<Uuid> {
    parse_id(raw).ok_or_else(|| ProjectError::StepNotFound(Uuid::nil()).into())
}

/// Check idea length in characters
pub fn validate_idea(idea: Option<&str>) -> Result<&str> {
    let idea = non_blank(idea).ok_or_else(|| AppError::validation("Идея не может быть пустой"))?;

    let chars = idea.chars().count();
    if chars < MIN_IDEA_CHARS {
        return Err(AppError::validation(
            "Идея слишком короткая. Опишите подробнее (минимум 20 символов)",
        ));
    }
    if chars > MAX_IDEA_CHARS {
        return Err(AppError::validation(
            "Идея слишком длинная. Сократите до 2000 символов",
        ));
    }

    Ok(idea)
}

/// POST /api/analyze-idea - Analyze an idea and create a project
#[tracing::instrument(name = "http.analyze_idea", skip(state, request))]
pub async fn analyze_idea(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalyzeIdeaRequest>,
) -> Result<Json<ApiResponse<IdeaAnalysisData>>> {
    let idea = validate_idea(request.idea.as_deref())?;

    let analysis = state.gateway.analyze_idea(idea).await?;
    let project = state.projects.create_project(idea, analysis);

    Ok(ApiResponse::ok(IdeaAnalysisData {
        project_id: project.id,
        problem: project.problem,
        product_vision: project.product_vision,
        key_features: project.key_features,
        created_at: project.created_at,
    }))
}

/// PUT /api/analyze-idea/{id} - Replace the product vision, or re-analyze it
/// with user corrections
#[tracing::instrument(name = "http.update_product_vision", skip(state, request))]
pub async fn update_product_vision(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateVisionRequest>,
) -> Result<Json<ApiResponse<VisionData>>> {
    let corrections = non_blank(request.corrections.as_deref());
    let vision = non_blank(request.product_vision.as_deref());
    if corrections.is_none() && vision.is_none() {
        return Err(AppError::validation(
            "Необходимо указать productVision или corrections",
        ));
    }

    let project = state.projects.get_project(project_id(&id)?)?;

    let (vision, features) = match corrections {
        Some(corrections) => {
            let prompt = format!(
                "{}\n\nПользователь попросил скорректировать:\n{}",
                project.product_vision, corrections
            );
            let analysis = state.gateway.analyze_idea(&prompt).await?;
            (analysis.product_vision, Some(analysis.key_features))
        }
        None => (
            vision.unwrap_or_default().to_string(),
            request.key_features.clone(),
        ),
    };

    let updated = state
        .projects
        .update_product_vision(project.id, vision, features)?;

    Ok(ApiResponse::ok(VisionData {
        project_id: updated.id,
        product_vision: updated.product_vision,
        key_features: updated.key_features,
        updated_at: updated.updated_at,
    }))
}

/// POST /api/generate-plan - Generate development steps for a project
#[tracing::instrument(name = "http.generate_plan", skip(state, request))]
pub async fn generate_plan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GeneratePlanRequest>,
) -> Result<Json<ApiResponse<PlanData>>> {
    let raw_id = non_blank(request.project_id.as_deref())
        .ok_or_else(|| AppError::validation("projectId обязателен"))?;

    let project = state.projects.get_project(project_id(raw_id)?)?;
    if project.product_vision.trim().is_empty() {
        return Err(AppError::validation(
            "Образ продукта не определен. Сначала проанализируйте идею.",
        ));
    }

    let new_steps = state
        .gateway
        .generate_plan(&project.product_vision, &project.key_features)
        .await?;
    let steps = state.projects.add_steps(project.id, new_steps)?;

    Ok(ApiResponse::ok(PlanData {
        project_id: project.id,
        total_steps: steps.len(),
        steps,
    }))
}

/// GET /api/generate-plan/{id} - Current plan of a project
#[tracing::instrument(name = "http.get_plan", skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProjectPlanData>>> {
    let project = state.projects.get_project(project_id(&id)?)?;
    let steps = state.projects.get_steps(project.id)?;

    Ok(ApiResponse::ok(ProjectPlanData {
        project_id: project.id,
        product_vision: project.product_vision,
        key_features: project.key_features,
        steps,
        progress: project.progress,
    }))
}

/// GET /api/steps/{id} - Steps of a project
#[tracing::instrument(name = "http.get_steps", skip(state))]
pub async fn get_steps(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StepsData>>> {
    let project = state.projects.get_project(project_id(&id)?)?;
    let steps = state.projects.get_steps(project.id)?;

    Ok(ApiResponse::ok(StepsData {
        project_id: project.id,
        steps,
        progress: project.progress,
    }))
}

/// GET /api/steps/step/{id}
#[tracing::instrument(name = "http.get_step", skip(state))]
pub async fn get_step(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Step>>> {
    let step = state.projects.get_step(step_id(&id)?)?;
    Ok(ApiResponse::ok(step))
}

/// POST /api/steps/{id}/complete
#[tracing::instrument(name = "http.complete_step", skip(state))]
pub async fn complete_step(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StepProgressData>>> {
    let (step, progress) = state.projects.complete_step(step_id(&id)?)?;
    Ok(ApiResponse::ok(StepProgressData { step, progress }))
}

/// POST /api/steps/{id}/uncomplete
#[tracing::instrument(name = "http.uncomplete_step", skip(state))]
pub async fn uncomplete_step(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StepProgressData>>> {
    let (step, progress) = state.projects.uncomplete_step(step_id(&id)?)?;
    Ok(ApiResponse::ok(StepProgressData { step, progress }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_idea_bounds() {
        assert!(validate_idea(None).is_err());
        assert!(validate_idea(Some("   ")).is_err());
        assert!(validate_idea(Some("слишком коротко")).is_err());
        assert!(validate_idea(Some(&"я".repeat(20))).is_ok());
        assert!(validate_idea(Some(&"я".repeat(2000))).is_ok());
        assert!(validate_idea(Some(&"я".repeat(2001))).is_err());
    }

    #[test]
    fn test_validate_idea_messages() {
        let err = validate_idea(Some("коротко")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Идея слишком короткая. Опишите подробнее (минимум 20 символов)"
        );
    }
}
