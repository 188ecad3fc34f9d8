use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// OpenRouter API endpoint, used for `vendor/model` slugs
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenAI API endpoint
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body size
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Model name; a `vendor/model` slug selects OpenRouter
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Overrides the provider endpoint derived from the model
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Classifications below this confidence require manual selection
    #[serde(default = "default_confidence_threshold")]
    pub category_confidence_threshold: f64,
    #[serde(default = "default_app_referer")]
    pub app_referer: String,
    #[serde(default = "default_app_title")]
    pub app_title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_templates_dir")]
    pub dir: PathBuf,
    /// Invalidate cached templates when their files change
    #[serde(default = "default_hot_reload")]
    pub hot_reload: bool,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Sessions older than this are evicted
    #[serde(default = "default_session_max_age")]
    pub max_age_secs: u64,
    /// Eviction sweep interval
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024 // 10 MiB, PRDs travel in request bodies
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_max_tokens() -> u32 {
    64000
}

fn default_request_timeout() -> u64 {
    300 // 5 minutes
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_app_referer() -> String {
    "https://vibe-assistant.local".to_string()
}

fn default_app_title() -> String {
    "Vibe Assistant".to_string()
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("prompts")
}

fn default_hot_reload() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    1000 // 1 second
}

fn default_session_max_age() -> u64 {
    24 * 60 * 60 // 24 hours
}

fn default_cleanup_interval() -> u64 {
    60 * 60 // 1 hour
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "vibe-assistant".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

/// Current run mode: `RUN_MODE`, then `NODE_ENV`, then `development`
pub fn run_mode() -> String {
    env::var("RUN_MODE")
        .or_else(|_| env::var("NODE_ENV"))
        .unwrap_or_else(|_| "development".into())
}

/// Whether `mode` names a production deployment
pub fn is_production_mode(mode: &str) -> bool {
    mode == "production" || mode == "prod"
}

/// Check if running in production mode
pub fn is_production() -> bool {
    is_production_mode(&run_mode())
}

/// Values taken from the environment variables of earlier deployments.
///
/// These win over every other source so existing `.env` files keep working.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyEnv {
    pub port: Option<u16>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl LegacyEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve legacy values through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = var("BACKEND_PORT").and_then(|p| p.trim().parse().ok());

        let model = match var("DEFAULT_MODEL") {
            Some(slug) if slug.contains('/') => Some(slug),
            default_model => var("AI_MODEL").or(default_model),
        };

        let openrouter = model.as_deref().is_some_and(is_openrouter_model);
        let api_key = if openrouter {
            var("OPENROUTER_API_KEY").or_else(|| var("OPENAI_API_KEY"))
        } else {
            var("OPENAI_API_KEY").or_else(|| var("OPENROUTER_API_KEY"))
        };

        Self {
            port,
            model,
            api_key,
        }
    }
}

/// Whether a model name is an OpenRouter `vendor/model` slug
pub fn is_openrouter_model(model: &str) -> bool {
    model.contains('/')
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        Self::load(&run_mode(), LegacyEnv::from_env())
    }

    /// Build settings for `run_mode` with explicit legacy overrides
    pub fn load(run_mode: &str, legacy: LegacyEnv) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("llm.model", default_model())?
            .set_default("llm.max_tokens", i64::from(default_max_tokens()))?
            .set_default("llm.category_confidence_threshold", default_confidence_threshold())?
            .set_default("templates.dir", "prompts")?
            .set_default("templates.hot_reload", !is_production_mode(run_mode))?
            .set_default("sessions.max_age_secs", default_session_max_age() as i64)?
            .set_default("sessions.cleanup_interval_secs", default_cleanup_interval() as i64)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // VIBE_SERVER__PORT, VIBE_LLM__MODEL, VIBE_TEMPLATES__HOT_RELOAD, etc.
            .add_source(
                Environment::with_prefix("VIBE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            // BACKEND_PORT, DEFAULT_MODEL/AI_MODEL, OPENROUTER_API_KEY/OPENAI_API_KEY
            .set_override_option("server.port", legacy.port.map(i64::from))?
            .set_override_option("llm.model", legacy.model)?
            .set_override_option("llm.api_key", legacy.api_key)?;

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl LlmConfig {
    pub fn is_openrouter(&self) -> bool {
        is_openrouter_model(&self.model)
    }

    /// Endpoint serving `/chat/completions` for the configured model
    pub fn endpoint(&self) -> &str {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.is_openrouter() => OPENROUTER_BASE_URL,
            None => OPENAI_BASE_URL,
        }
    }

    /// Whether a usable API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            category_confidence_threshold: default_confidence_threshold(),
            app_referer: default_app_referer(),
            app_title: default_app_title(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: default_templates_dir(),
            hot_reload: default_hot_reload(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_session_max_age(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 3001);

        let llm = LlmConfig::default();
        assert_eq!(llm.max_tokens, 64000);
        assert_eq!(llm.category_confidence_threshold, 0.7);

        let sessions = SessionConfig::default();
        assert_eq!(sessions.max_age_secs, 86400);
        assert_eq!(sessions.cleanup_interval_secs, 3600);
    }

    #[test]
    fn test_legacy_env_openrouter_model_prefers_openrouter_key() {
        let legacy = LegacyEnv::from_lookup(lookup(&[
            ("DEFAULT_MODEL", "alibaba/tongyi-deepresearch-30b-a3b:free"),
            ("AI_MODEL", "gpt-4o"),
            ("OPENROUTER_API_KEY", "sk-or"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("BACKEND_PORT", "4000"),
        ]));

        assert_eq!(
            legacy.model.as_deref(),
            Some("alibaba/tongyi-deepresearch-30b-a3b:free")
        );
        assert_eq!(legacy.api_key.as_deref(), Some("sk-or"));
        assert_eq!(legacy.port, Some(4000));
    }

    #[test]
    fn test_legacy_env_openai_model() {
        let legacy = LegacyEnv::from_lookup(lookup(&[
            ("AI_MODEL", "gpt-4o"),
            ("OPENROUTER_API_KEY", "sk-or"),
            ("OPENAI_API_KEY", "sk-openai"),
        ]));

        assert_eq!(legacy.model.as_deref(), Some("gpt-4o"));
        assert_eq!(legacy.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(legacy.port, None);
    }

    #[test]
    fn test_legacy_env_ignores_blank_and_invalid_values() {
        let legacy = LegacyEnv::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "  "),
            ("OPENROUTER_API_KEY", "sk-or"),
            ("BACKEND_PORT", "not-a-port"),
        ]));

        assert_eq!(legacy.api_key.as_deref(), Some("sk-or"));
        assert_eq!(legacy.port, None);
        assert_eq!(legacy.model, None);
    }

    #[test]
    fn test_load_applies_legacy_overrides() {
        let legacy = LegacyEnv {
            port: Some(4321),
            model: Some("openai/gpt-4o".to_string()),
            api_key: Some("sk-test".to_string()),
        };

        let settings = Settings::load("test", legacy).unwrap();
        assert_eq!(settings.server.port, 4321);
        assert_eq!(settings.llm.model, "openai/gpt-4o");
        assert!(settings.llm.has_api_key());
        assert!(settings.llm.is_openrouter());
        assert_eq!(settings.llm.endpoint(), OPENROUTER_BASE_URL);
    }

    #[test]
    fn test_hot_reload_off_in_production() {
        let settings = Settings::load("production", LegacyEnv::default()).unwrap();
        assert!(!settings.templates.hot_reload);

        let settings = Settings::load("development", LegacyEnv::default()).unwrap();
        assert!(settings.templates.hot_reload);
    }

    #[test]
    fn test_endpoint_selection() {
        let mut llm = LlmConfig::default();
        assert_eq!(llm.endpoint(), OPENAI_BASE_URL);

        llm.model = "anthropic/claude-3.5-sonnet".to_string();
        assert_eq!(llm.endpoint(), OPENROUTER_BASE_URL);

        llm.base_url = Some("http://localhost:8080/v1/".to_string());
        assert_eq!(llm.endpoint(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_production_mode_names() {
        assert!(is_production_mode("production"));
        assert!(is_production_mode("prod"));
        assert!(!is_production_mode("development"));
    }
}
