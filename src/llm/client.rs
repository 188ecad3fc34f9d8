use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, warn};

use crate::config::LlmConfig;

use super::error::{LlmError, LlmResult};
use super::types::{ChatCompletionRequest, ChatCompletionResponse, CompletionRequest};

/// Chat completion backend
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Model the backend sends requests to
    fn model(&self) -> &str;

    /// Run a completion and return the assistant text
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String>;
}

/// Client for OpenAI-compatible `/chat/completions` APIs (OpenAI, OpenRouter)
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    model: String,
    api_key: Option<String>,
    base_url: String,
    /// `HTTP-Referer` and `X-Title`, sent to OpenRouter only
    app_headers: Option<(String, String)>,
}

impl OpenAiClient {
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(e.to_string()))?;

        let app_headers = config
            .is_openrouter()
            .then(|| (config.app_referer.clone(), config.app_title.clone()));

        Ok(Self {
            client,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            base_url: config.endpoint().to_string(),
            app_headers,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<String> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: request.messages(),
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
        };

        debug!(
            model = %self.model,
            prompt_chars = request.user.chars().count(),
            "Sending chat completion"
        );

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if let Some((referer, title)) = &self.app_headers {
            builder = builder
                .header("HTTP-Referer", referer)
                .header("X-Title", title);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let err = LlmError::from_status(status.as_u16(), &error_text);
            if matches!(err, LlmError::RateLimited) {
                warn!(status = status.as_u16(), "Rate limited by LLM provider");
            } else {
                error!(status = status.as_u16(), body = %error_text, "LLM API error");
            }
            return Err(err);
        }

        let completion: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = &completion.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Chat completion usage"
            );
        }

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("no choices returned".to_string()))?;

        if choice.finish_reason.as_deref() == Some("length") {
            warn!(model = %self.model, "Completion truncated by max_tokens");
        }

        choice
            .message
            .content
            .ok_or_else(|| LlmError::InvalidResponse("empty message content".to_string()))
    }
}
