//! Wizard and legacy operations on top of a chat completion backend

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::metrics::LlmMetrics;
use crate::project::{IdeaAnalysis, NewStep};
use crate::questions::{Category, ProjectGoal};
use crate::session::PromptSet;
use crate::template::{bindings, Bindings, Renderer};

use super::client::ChatCompletion;
use super::error::{LlmError, LlmResult};
use super::extract::{extract_array, extract_object};
use super::types::{CategoryAnalysis, CompletionRequest, RawCategoryAnalysis};

const CATEGORY_SYSTEM_ROLE: &str = "Ты эксперт по классификации типов программных продуктов.";
const QUESTIONS_SYSTEM_ROLE: &str =
    "Ты эксперт по product discovery. Задаешь правильные вопросы о продукте.";
const PRD_SYSTEM_ROLE: &str =
    "Ты опытный product manager и архитектор. Пишешь детальные PRD на русском языке.";
const IDEA_SYSTEM_ROLE: &str =
    "Ты опытный product manager. Превращаешь сырую идею в четкий образ продукта.";
const PLAN_SYSTEM_ROLE: &str =
    "Ты опытный технический лид. Разбиваешь продукт на небольшие шаги разработки с AI-ассистентом.";

const CATEGORY_TEMPERATURE: f32 = 0.3;
const CATEGORY_MAX_TOKENS: u32 = 500;
const CREATIVE_TEMPERATURE: f32 = 0.7;

/// LLM-backed operations of the wizard.
///
/// Prompts come from the template catalog; calls are never retried.
#[derive(Clone)]
pub struct LlmGateway {
    client: Arc<dyn ChatCompletion>,
    renderer: Renderer,
    max_tokens: u32,
    confidence_threshold: f64,
}

impl LlmGateway {
    pub fn new(
        client: Arc<dyn ChatCompletion>,
        renderer: Renderer,
        max_tokens: u32,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            client,
            renderer,
            max_tokens,
            confidence_threshold,
        }
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Classify an idea. `None` means the category must be chosen manually.
    #[tracing::instrument(name = "llm.analyze_category", skip_all)]
    pub async fn analyze_category(&self, idea: &str) -> LlmResult<Option<CategoryAnalysis>> {
        let prompt = self
            .renderer
            .render("analyze-category", &bindings(json!({ "ideaDescription": idea })))
            .await?;

        let content = self
            .call(
                "analyze_category",
                CATEGORY_SYSTEM_ROLE,
                prompt,
                CATEGORY_TEMPERATURE,
                CATEGORY_MAX_TOKENS,
            )
            .await?;

        let value = match extract_object(&content) {
            Some(parsed) => parsed.map_err(|e| LlmError::InvalidResponse(e.to_string()))?,
            None => {
                warn!("No JSON object in classification response");
                return Ok(None);
            }
        };
        let raw: RawCategoryAnalysis =
            serde_json::from_value(value).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        if raw.confidence < self.confidence_threshold {
            info!(
                confidence = raw.confidence,
                threshold = self.confidence_threshold,
                "Category confidence below threshold"
            );
            return Ok(None);
        }

        let Some(category) = raw.category.as_deref().and_then(|c| c.parse::<Category>().ok())
        else {
            warn!(category = ?raw.category, "Unknown category in classification response");
            return Ok(None);
        };

        info!(category = %category, confidence = raw.confidence, "Category detected");
        Ok(Some(CategoryAnalysis {
            category,
            confidence: raw.confidence,
            reasoning: raw.reasoning,
        }))
    }

    /// Follow-up questions tailored to the idea and the base answers
    #[tracing::instrument(name = "llm.generate_adaptive_questions", skip_all, fields(category = %category))]
    pub async fn generate_adaptive_questions(
        &self,
        idea: &str,
        category: Category,
        base_answers: &Value,
    ) -> LlmResult<Vec<Value>> {
        let prompt = self
            .renderer
            .render(
                "generate-adaptive-questions",
                &bindings(json!({
                    "ideaDescription": idea,
                    "category": category.as_str(),
                    "baseAnswers": pretty_json(base_answers),
                })),
            )
            .await?;

        let content = self
            .call(
                "generate_adaptive_questions",
                QUESTIONS_SYSTEM_ROLE,
                prompt,
                CREATIVE_TEMPERATURE,
                self.max_tokens,
            )
            .await?;

        let questions = extract_array(&content)
            .ok_or_else(|| {
                LlmError::Other("AI не вернул валидный JSON массив вопросов".to_string())
            })?
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        info!(count = questions.len(), "Adaptive questions generated");
        Ok(questions)
    }

    /// Full product requirements document as markdown
    #[tracing::instrument(name = "llm.generate_prd", skip_all, fields(category = %category, goal = %goal))]
    pub async fn generate_prd(
        &self,
        idea: &str,
        category: Category,
        all_answers: &Value,
        goal: ProjectGoal,
    ) -> LlmResult<String> {
        let prompt = self
            .renderer
            .render(
                "generate-prd",
                &bindings(json!({
                    "ideaDescription": idea,
                    "category": category.as_str(),
                    "allAnswers": pretty_json(all_answers),
                    "goal": goal.as_str(),
                })),
            )
            .await?;

        let started = Instant::now();
        let prd = self
            .call(
                "generate_prd",
                PRD_SYSTEM_ROLE,
                prompt,
                CREATIVE_TEMPERATURE,
                self.max_tokens,
            )
            .await?;

        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            chars = prd.chars().count(),
            "PRD generated"
        );
        Ok(prd)
    }

    /// Render the setup, planning, implementation and deploy prompts for a PRD
    #[tracing::instrument(name = "llm.generate_prompts", skip_all, fields(category = %category, goal = %goal))]
    pub async fn generate_prompts(
        &self,
        prd: &str,
        goal: ProjectGoal,
        category: Category,
    ) -> LlmResult<PromptSet> {
        let vars = downstream_bindings(prd, goal, category);

        let (setup, planning, implementation, deploy_vercel, deploy_docker, deploy_local) = futures::try_join!(
            self.renderer.render("setup-prompt", &vars),
            self.renderer.render("planning-prompt", &vars),
            self.renderer.render("implementation-prompt", &vars),
            self.renderer.render("deploy-vercel", &vars),
            self.renderer.render("deploy-docker", &vars),
            self.renderer.render("deploy-local", &vars),
        )?;

        info!("Prompts generated");
        Ok(PromptSet {
            setup: Some(setup),
            planning: Some(planning),
            implementation: Some(implementation),
            deploy_vercel: Some(deploy_vercel),
            deploy_docker: Some(deploy_docker),
            deploy_local: Some(deploy_local),
            debug_prompt: None,
        })
    }

    /// Prompt asking the coding assistant to fix a described error
    pub async fn generate_debug_prompt(
        &self,
        error_description: &str,
        prd: &str,
    ) -> LlmResult<String> {
        let prompt = self
            .renderer
            .render(
                "debug-prompt",
                &bindings(json!({
                    "errorDescription": error_description,
                    "prd": prd,
                })),
            )
            .await?;
        Ok(prompt)
    }

    /// Turn a raw idea into a problem statement, product vision and key features
    #[tracing::instrument(name = "llm.analyze_idea", skip_all)]
    pub async fn analyze_idea(&self, idea: &str) -> LlmResult<IdeaAnalysis> {
        let prompt = self
            .renderer
            .render("analyze-idea", &bindings(json!({ "idea": idea })))
            .await?;

        let content = self
            .call(
                "analyze_idea",
                IDEA_SYSTEM_ROLE,
                prompt,
                CREATIVE_TEMPERATURE,
                self.max_tokens,
            )
            .await?;

        let value = extract_object(&content)
            .ok_or_else(|| LlmError::Other("AI не вернул валидный JSON анализа идеи".to_string()))?
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        serde_json::from_value(value).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    /// Ordered development plan for a product vision. Fails with `EmptyPlan`
    /// when the model returned no steps.
    #[tracing::instrument(name = "llm.generate_plan", skip_all)]
    pub async fn generate_plan(
        &self,
        product_vision: &str,
        key_features: &[String],
    ) -> LlmResult<Vec<NewStep>> {
        let features = key_features
            .iter()
            .map(|f| format!("- {}", f))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = self
            .renderer
            .render(
                "generate-plan",
                &bindings(json!({
                    "productVision": product_vision,
                    "keyFeatures": features,
                })),
            )
            .await?;

        let content = self
            .call(
                "generate_plan",
                PLAN_SYSTEM_ROLE,
                prompt,
                CREATIVE_TEMPERATURE,
                self.max_tokens,
            )
            .await?;

        let Some(parsed) = extract_array(&content) else {
            warn!("No JSON array in plan response");
            return Err(LlmError::EmptyPlan);
        };
        let items = parsed.map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let steps: Vec<NewStep> = serde_json::from_value(Value::Array(items))
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        if steps.is_empty() {
            return Err(LlmError::EmptyPlan);
        }

        info!(steps = steps.len(), "Plan generated");
        Ok(steps)
    }

    async fn call(
        &self,
        operation: &'static str,
        system: &str,
        user: String,
        temperature: f32,
        max_tokens: u32,
    ) -> LlmResult<String> {
        let request = CompletionRequest {
            system: system.to_string(),
            user,
            temperature,
            max_tokens,
        };

        let started = Instant::now();
        let result = self.client.complete(request).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(_) => LlmMetrics::record_success(operation, elapsed),
            Err(e) => {
                LlmMetrics::record_failure(operation, e.kind(), elapsed);
                warn!(
                    operation,
                    kind = e.kind(),
                    detail = e.detail().unwrap_or_default(),
                    error = %e,
                    "LLM call failed"
                );
            }
        }

        result
    }
}

/// Bindings shared by the downstream prompt templates
pub fn downstream_bindings(prd: &str, goal: ProjectGoal, category: Category) -> Bindings {
    bindings(json!({
        "prd": prd,
        "goal": goal.as_str(),
        "category": category.as_str(),
        "categoryName": category.display_name(),
        "deployTarget": goal.deploy_target().as_str(),
        "testsRequired": goal.tests_required(),
        "documentationRequired": goal.documentation_required(),
    }))
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
