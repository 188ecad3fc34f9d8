//! Wizard session types

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::questions::{Category, ProjectGoal};

/// First wizard step
pub const FIRST_STEP: u8 = 1;

/// Last wizard step
pub const LAST_STEP: u8 = 10;

/// Prompts generated from a PRD
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_vercel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_docker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_local: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_prompt: Option<String>,
}

/// Progress of one user through the wizard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub current_step: u8,
    pub idea_description: Option<String>,
    pub category: Option<Category>,
    pub category_confidence: Option<f64>,
    pub base_answers: HashMap<String, String>,
    /// Questions as generated by the LLM
    pub adaptive_questions: Vec<Value>,
    pub adaptive_answers: HashMap<String, String>,
    pub prd: Option<String>,
    pub prompts: PromptSet,
    pub project_goal: Option<ProjectGoal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// A session at the first step, created at `now`
    pub fn new(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            current_step: FIRST_STEP,
            idea_description: None,
            category: None,
            category_confidence: None,
            base_answers: HashMap::new(),
            adaptive_questions: Vec::new(),
            adaptive_answers: HashMap::new(),
            prd: None,
            prompts: PromptSet::default(),
            project_goal: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fields a client may change. Absent and null fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub current_step: Option<u8>,
    pub idea_description: Option<String>,
    pub category: Option<Category>,
    pub category_confidence: Option<f64>,
    pub base_answers: Option<HashMap<String, String>>,
    pub adaptive_questions: Option<Vec<Value>>,
    pub adaptive_answers: Option<HashMap<String, String>>,
    pub prd: Option<String>,
    pub prompts: Option<PromptSet>,
    pub project_goal: Option<ProjectGoal>,
}

/// Aggregate counters over live sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total: usize,
    pub by_step: BTreeMap<u8, usize>,
    pub by_category: BTreeMap<Category, usize>,
    pub by_goal: BTreeMap<ProjectGoal, usize>,
}

/// Session store error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Сессия не найдена: {0}")]
    NotFound(Uuid),

    #[error("Некорректный шаг мастера: {0} (допустимо от 1 до 10)")]
    InvalidStep(u8),
}

pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_session_serializes_camel_case() {
        let session = Session::new(Uuid::nil(), Utc::now());
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["currentStep"], json!(1));
        assert_eq!(value["ideaDescription"], json!(null));
        assert_eq!(value["prompts"], json!({}));
        assert_eq!(value["adaptiveQuestions"], json!([]));
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_update_accepts_partial_body() {
        let update: SessionUpdate = serde_json::from_value(json!({
            "currentStep": 3,
            "category": "BOT",
            "projectGoal": "Портфолио",
            "unknownField": true
        }))
        .unwrap();

        assert_eq!(update.current_step, Some(3));
        assert_eq!(update.category, Some(Category::Bot));
        assert_eq!(update.project_goal, Some(ProjectGoal::Portfolio));
        assert!(update.prd.is_none());
    }

    #[test]
    fn test_stats_keys_serialize_as_strings() {
        let mut stats = SessionStats::default();
        stats.by_step.insert(2, 1);
        stats.by_goal.insert(ProjectGoal::Learning, 1);

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["byStep"], json!({"2": 1}));
        assert_eq!(value["byGoal"], json!({"Обучение и практика": 1}));
    }
}
