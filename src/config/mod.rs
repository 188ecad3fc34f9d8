mod settings;

pub use settings::{
    is_openrouter_model, is_production, is_production_mode, run_mode, LegacyEnv, LlmConfig,
    LogFormat, LoggingConfig, OtelConfig, ServerConfig, SessionConfig, Settings, TemplateConfig,
    OPENAI_BASE_URL, OPENROUTER_BASE_URL,
};
