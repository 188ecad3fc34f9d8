//! Base question catalog endpoints.

use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::questions::{
    base_questions, validate_base_answers, AnswerValidation, BaseQuestion, Category,
};

use super::extract::ApiJson;

#[derive(Debug, Deserialize)]
pub struct ValidateAnswersRequest {
    #[serde(default)]
    pub answers: Option<Value>,
}

/// Display metadata of a category
#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub id: Category,
    pub name: &'static str,
    pub emoji: &'static str,
}

/// GET /api/questions/categories
pub async fn list_categories() -> Json<Vec<CategoryInfo>> {
    Json(
        Category::ALL
            .into_iter()
            .map(|category| CategoryInfo {
                id: category,
                name: category.display_name(),
                emoji: category.emoji(),
            })
            .collect(),
    )
}

/// GET /api/questions/base
pub async fn list_base_questions() -> Json<&'static [BaseQuestion]> {
    Json(base_questions())
}

/// POST /api/questions/validate
#[tracing::instrument(name = "http.validate_answers", skip_all)]
pub async fn validate_answers(
    ApiJson(request): ApiJson<ValidateAnswersRequest>,
) -> Result<Json<AnswerValidation>> {
    let answers = match request.answers {
        None | Some(Value::Null) => {
            return Err(AppError::validation("Не переданы ответы для валидации"))
        }
        Some(Value::Object(map)) => map,
        Some(_) => Map::new(),
    };

    Ok(Json(validate_base_answers(&answers)))
}
