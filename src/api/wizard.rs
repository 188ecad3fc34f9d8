//! LLM-backed wizard endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::llm::CategoryAnalysis;
use crate::questions::{Category, ProjectGoal};
use crate::server::AppState;
use crate::session::PromptSet;

use super::extract::{non_blank, ApiJson};

const MISSING_PARAMETERS: &str = "Не переданы все необходимые параметры";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCategoryRequest {
    #[serde(default)]
    pub idea_description: Option<String>,
}

/// Detected category, or a request for manual selection
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CategoryResponse {
    Detected(CategoryAnalysis),
    #[serde(rename_all = "camelCase")]
    Manual {
        category: Option<Category>,
        confidence: f64,
        requires_manual_selection: bool,
    },
}

impl CategoryResponse {
    fn manual() -> Self {
        CategoryResponse::Manual {
            category: None,
            confidence: 0.0,
            requires_manual_selection: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveQuestionsRequest {
    #[serde(default)]
    pub idea_description: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub base_answers: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AdaptiveQuestionsResponse {
    pub questions: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePrdRequest {
    #[serde(default)]
    pub idea_description: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub all_answers: Option<Value>,
    #[serde(default)]
    pub goal: Option<ProjectGoal>,
}

#[derive(Debug, Serialize)]
pub struct GeneratePrdResponse {
    pub prd: String,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePromptsRequest {
    #[serde(default)]
    pub prd: Option<String>,
    #[serde(default)]
    pub goal: Option<ProjectGoal>,
    #[serde(default)]
    pub category: Option<Category>,
}

#[derive(Debug, Serialize)]
pub struct GeneratePromptsResponse {
    pub prompts: PromptSet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugPromptRequest {
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub prd: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugPromptResponse {
    pub debug_prompt: String,
}

/// Present and not JSON null
fn provided(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

/// POST /api/analyze-category - Detect the product category of an idea
#[tracing::instrument(name = "http.analyze_category", skip(state, request))]
pub async fn analyze_category(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalyzeCategoryRequest>,
) -> Result<Json<CategoryResponse>> {
    let idea = non_blank(request.idea_description.as_deref())
        .ok_or_else(|| AppError::validation("Не передано описание идеи"))?;

    let response = match state.gateway.analyze_category(idea).await? {
        Some(analysis) => CategoryResponse::Detected(analysis),
        None => CategoryResponse::manual(),
    };

    Ok(Json(response))
}

/// POST /api/generate-adaptive-questions
#[tracing::instrument(name = "http.generate_adaptive_questions", skip(state, request))]
pub async fn generate_adaptive_questions(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AdaptiveQuestionsRequest>,
) -> Result<Json<AdaptiveQuestionsResponse>> {
    let (Some(idea), Some(category), Some(base_answers)) = (
        non_blank(request.idea_description.as_deref()),
        request.category,
        provided(request.base_answers),
    ) else {
        return Err(AppError::validation(MISSING_PARAMETERS));
    };

    let questions = state
        .gateway
        .generate_adaptive_questions(idea, category, &base_answers)
        .await?;

    Ok(Json(AdaptiveQuestionsResponse { questions }))
}

/// POST /api/generate-prd
#[tracing::instrument(name = "http.generate_prd", skip(state, request))]
pub async fn generate_prd(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GeneratePrdRequest>,
) -> Result<Json<GeneratePrdResponse>> {
    let (Some(idea), Some(category), Some(all_answers), Some(goal)) = (
        non_blank(request.idea_description.as_deref()),
        request.category,
        provided(request.all_answers),
        request.goal,
    ) else {
        return Err(AppError::validation(MISSING_PARAMETERS));
    };

    let prd = state
        .gateway
        .generate_prd(idea, category, &all_answers, goal)
        .await?;

    Ok(Json(GeneratePrdResponse { prd }))
}

/// POST /api/generate-prompts
#[tracing::instrument(name = "http.generate_prompts", skip(state, request))]
pub async fn generate_prompts(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GeneratePromptsRequest>,
) -> Result<Json<GeneratePromptsResponse>> {
    let (Some(prd), Some(goal), Some(category)) = (
        non_blank(request.prd.as_deref()),
        request.goal,
        request.category,
    ) else {
        return Err(AppError::validation(MISSING_PARAMETERS));
    };

    let prompts = state.gateway.generate_prompts(prd, goal, category).await?;
    Ok(Json(GeneratePromptsResponse { prompts }))
}

/// POST /api/generate-debug-prompt
#[tracing::instrument(name = "http.generate_debug_prompt", skip(state, request))]
pub async fn generate_debug_prompt(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DebugPromptRequest>,
) -> Result<Json<DebugPromptResponse>> {
    let error_description = non_blank(request.error_description.as_deref())
        .ok_or_else(|| AppError::validation("Не передано описание ошибки"))?;

    let debug_prompt = state
        .gateway
        .generate_debug_prompt(error_description, request.prd.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(DebugPromptResponse { debug_prompt }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_manual_category_response_shape() {
        let value = serde_json::to_value(CategoryResponse::manual()).unwrap();
        assert_eq!(
            value,
            json!({"category": null, "confidence": 0.0, "requiresManualSelection": true})
        );
    }

    #[test]
    fn test_detected_category_response_shape() {
        let value = serde_json::to_value(CategoryResponse::Detected(CategoryAnalysis {
            category: Category::MobileApp,
            confidence: 0.8,
            reasoning: None,
        }))
        .unwrap();
        assert_eq!(value, json!({"category": "MOBILE_APP", "confidence": 0.8}));
    }
}
