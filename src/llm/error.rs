use thiserror::Error;

use crate::template::TemplateError;

use super::types::ApiErrorResponse;

/// Error code signalling rate limiting regardless of HTTP status
const RATE_LIMIT_CODE: &str = "rate_limit_exceeded";

/// LLM call failure.
///
/// Display strings are shown to end users as-is; details are for logs only.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Превышен лимит запросов. Подождите минуту и попробуйте снова.")]
    RateLimited,

    #[error("Превышено время ожидания. Проверьте интернет-соединение и попробуйте снова.")]
    Timeout,

    #[error("Нет связи с сервером AI. Проверьте интернет-соединение.")]
    Network { detail: String },

    #[error("Ошибка аутентификации. Проверьте API ключ в настройках.")]
    Authentication { status: u16 },

    #[error("Некорректный запрос к AI. Попробуйте переформулировать или обратитесь в поддержку.")]
    BadRequest { detail: String },

    #[error("Ошибка сервера AI. Попробуйте позже.")]
    Server { status: u16, detail: String },

    #[error("AI вернул некорректный ответ: {0}")]
    InvalidResponse(String),

    #[error("Не удалось сгенерировать план. Попробуйте еще раз.")]
    EmptyPlan,

    #[error("Ошибка AI: {0}")]
    Other(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

pub type LlmResult<T> = Result<T, LlmError>;

impl LlmError {
    /// Map a non-success HTTP response
    pub fn from_status(status: u16, body: &str) -> Self {
        let api_error = serde_json::from_str::<ApiErrorResponse>(body).ok();
        let code = api_error.as_ref().and_then(|e| e.error.code_str());
        let message = api_error
            .map(|e| e.error.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| body.trim().to_string());

        if status == 429 || code.as_deref() == Some(RATE_LIMIT_CODE) {
            return LlmError::RateLimited;
        }

        match status {
            401 | 403 => LlmError::Authentication { status },
            400 => LlmError::BadRequest { detail: message },
            s if s >= 500 => LlmError::Server {
                status,
                detail: message,
            },
            _ => LlmError::Other(if message.is_empty() {
                format!("HTTP {}", status)
            } else {
                message
            }),
        }
    }

    /// Label used in metrics
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::RateLimited => "rate_limited",
            LlmError::Timeout => "timeout",
            LlmError::Network { .. } => "network",
            LlmError::Authentication { .. } => "authentication",
            LlmError::BadRequest { .. } => "bad_request",
            LlmError::Server { .. } => "server",
            LlmError::InvalidResponse(_) => "invalid_response",
            LlmError::EmptyPlan => "empty_plan",
            LlmError::Other(_) => "other",
            LlmError::Template(_) => "template",
        }
    }

    /// Details for logs, beyond the user-facing message
    pub fn detail(&self) -> Option<&str> {
        match self {
            LlmError::Network { detail }
            | LlmError::BadRequest { detail }
            | LlmError::Server { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Network {
                detail: err.to_string(),
            }
        } else if err.is_decode() {
            LlmError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            LlmError::from_status(status.as_u16(), "")
        } else {
            LlmError::Other(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(LlmError::from_status(429, ""), LlmError::RateLimited));
        assert!(matches!(
            LlmError::from_status(401, ""),
            LlmError::Authentication { status: 401 }
        ));
        assert!(matches!(
            LlmError::from_status(403, ""),
            LlmError::Authentication { status: 403 }
        ));
        assert!(matches!(LlmError::from_status(400, "bad"), LlmError::BadRequest { .. }));
        assert!(matches!(
            LlmError::from_status(503, ""),
            LlmError::Server { status: 503, .. }
        ));
        assert!(matches!(LlmError::from_status(404, "missing"), LlmError::Other(_)));
    }

    #[test]
    fn test_rate_limit_code_wins_over_status() {
        let body = r#"{"error": {"message": "quota", "code": "rate_limit_exceeded"}}"#;
        assert!(matches!(LlmError::from_status(400, body), LlmError::RateLimited));
    }

    #[test]
    fn test_api_message_kept_as_detail() {
        let body = r#"{"error": {"message": "model overloaded", "type": "server_error"}}"#;
        let err = LlmError::from_status(502, body);
        assert_eq!(err.detail(), Some("model overloaded"));
        assert_eq!(err.to_string(), "Ошибка сервера AI. Попробуйте позже.");
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let errors = [
            LlmError::RateLimited,
            LlmError::Timeout,
            LlmError::Network {
                detail: String::new(),
            },
            LlmError::Authentication { status: 401 },
            LlmError::BadRequest {
                detail: String::new(),
            },
            LlmError::Server {
                status: 500,
                detail: String::new(),
            },
        ];

        let mut messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn test_other_message_prefix() {
        assert_eq!(
            LlmError::Other("boom".to_string()).to_string(),
            "Ошибка AI: boom"
        );
    }
}
