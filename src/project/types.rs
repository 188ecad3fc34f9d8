//! Legacy project and plan step types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default duration of a step when the plan omits one
pub const DEFAULT_STEP_MINUTES: u32 = 30;

/// Product analysis of a raw idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaAnalysis {
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub product_vision: String,
    #[serde(default)]
    pub key_features: Vec<String>,
}

/// Completion counters of a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub idea: String,
    pub problem: String,
    pub product_vision: String,
    pub key_features: Vec<String>,
    /// Step ids in plan order
    pub steps: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub progress: Progress,
}

/// A step of a generated plan, before it is stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStep {
    #[serde(default)]
    pub order: Option<u32>,
    pub title: String,
    pub prompt: String,
    #[serde(default)]
    pub dod: Vec<String>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: Uuid,
    pub project_id: Uuid,
    pub order: u32,
    pub title: String,
    pub prompt: String,
    /// Definition of done
    pub dod: Vec<String>,
    pub estimated_minutes: u32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Project store error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    #[error("Проект не найден")]
    ProjectNotFound(Uuid),

    #[error("Шаг не найден")]
    StepNotFound(Uuid),
}

pub type ProjectResult<T> = Result<T, ProjectError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_step_defaults() {
        let step: NewStep = serde_json::from_value(json!({
            "title": "Setup",
            "prompt": "Create the project"
        }))
        .unwrap();

        assert_eq!(step.order, None);
        assert!(step.dod.is_empty());
        assert_eq!(step.estimated_minutes, None);
    }

    #[test]
    fn test_idea_analysis_camel_case() {
        let analysis: IdeaAnalysis = serde_json::from_value(json!({
            "problem": "p",
            "productVision": "v",
            "keyFeatures": ["a", "b"]
        }))
        .unwrap();

        assert_eq!(analysis.product_vision, "v");
        assert_eq!(analysis.key_features.len(), 2);
    }
}
