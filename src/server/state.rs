use std::sync::Arc;

use crate::config::Settings;
use crate::llm::{create_llm_gateway, ChatCompletion, LlmGateway, LlmResult};
use crate::project::{create_project_store, ProjectStore};
use crate::session::{create_session_store, SessionStore};
use crate::template::{create_template_store, Renderer, TemplateStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<SessionStore>,
    pub projects: Arc<ProjectStore>,
    pub templates: Arc<TemplateStore>,
    pub gateway: Arc<LlmGateway>,
}

impl AppState {
    /// State backed by the configured HTTP LLM backend
    pub fn new(settings: Settings) -> LlmResult<Self> {
        let templates = create_template_store(settings.templates.dir.clone());
        let gateway = create_llm_gateway(&settings.llm, Renderer::new(templates.clone()))?;

        Ok(Self::assemble(settings, templates, gateway))
    }

    /// State over an explicit chat completion backend
    pub fn with_client(settings: Settings, client: Arc<dyn ChatCompletion>) -> Self {
        let templates = create_template_store(settings.templates.dir.clone());
        let gateway = Arc::new(LlmGateway::new(
            client,
            Renderer::new(templates.clone()),
            settings.llm.max_tokens,
            settings.llm.category_confidence_threshold,
        ));

        Self::assemble(settings, templates, gateway)
    }

    fn assemble(
        settings: Settings,
        templates: Arc<TemplateStore>,
        gateway: Arc<LlmGateway>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            sessions: create_session_store(),
            projects: create_project_store(),
            templates,
            gateway,
        }
    }
}
