//! LLM gateway.
//!
//! - [`ChatCompletion`]: the backend seam, implemented over HTTP by [`OpenAiClient`]
//! - [`LlmGateway`]: wizard operations that render catalog prompts, call the
//!   backend and parse its output
//! - [`LlmError`]: upstream failures with user-facing messages

mod client;
mod error;
mod extract;
mod gateway;
mod types;

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::template::Renderer;

pub use client::{ChatCompletion, OpenAiClient};
pub use error::{LlmError, LlmResult};
pub use extract::{array_span, extract_array, extract_object, object_span};
pub use gateway::{downstream_bindings, LlmGateway};
pub use types::{
    ApiErrorDetail, ApiErrorResponse, CategoryAnalysis, ChatCompletionRequest,
    ChatCompletionResponse, ChatMessage, CompletionRequest, Role,
};

/// Build the gateway over the configured HTTP backend
pub fn create_llm_gateway(config: &LlmConfig, renderer: Renderer) -> LlmResult<Arc<LlmGateway>> {
    let client = OpenAiClient::from_config(config)?;
    tracing::info!(
        model = %config.model,
        endpoint = client.base_url(),
        openrouter = config.is_openrouter(),
        max_tokens = config.max_tokens,
        "LLM client configured"
    );

    Ok(Arc::new(LlmGateway::new(
        Arc::new(client),
        renderer,
        config.max_tokens,
        config.category_confidence_threshold,
    )))
}
