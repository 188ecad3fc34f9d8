//! Request extractors with API-shaped rejections.

use axum::extract::FromRequest;
use uuid::Uuid;

use crate::error::AppError;

/// JSON body. Malformed bodies are rejected with a 400 error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Parse a path id. Ids that are not UUIDs cannot exist in any store.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Present and not blank
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()), Some(id));
        assert_eq!(parse_id("not-a-uuid"), None);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("a")), Some("a"));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }
}
