//! Template types and errors

use std::path::PathBuf;

use thiserror::Error;

/// Variable bindings supplied at render time
pub type Bindings = serde_json::Map<String, serde_json::Value>;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template \"{name}\" not found in {}", dir.display())]
    NotFound { name: String, dir: PathBuf },

    #[error("Invalid template name: {0}")]
    InvalidName(String),

    #[error("Failed to read template \"{name}\": {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list templates in {}: {source}", dir.display())]
    List {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Build bindings from a JSON value.
///
/// Non-object values produce empty bindings.
pub fn bindings(value: serde_json::Value) -> Bindings {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Bindings::new(),
    }
}

/// Check that a template name is safe to resolve inside the template directory
pub fn validate_name(name: &str) -> TemplateResult<()> {
    if name.is_empty() || name.len() > 64 {
        return Err(TemplateError::InvalidName(
            "name must be 1-64 characters".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(TemplateError::InvalidName(format!(
            "\"{}\" must contain only alphanumeric, dash, or underscore",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_name_accepts_catalog_names() {
        assert!(validate_name("generate-prd").is_ok());
        assert!(validate_name("deploy_local").is_ok());
    }

    #[test]
    fn test_validate_name_rejects_traversal() {
        assert!(matches!(
            validate_name("../secrets"),
            Err(TemplateError::InvalidName(_))
        ));
        assert!(matches!(validate_name(""), Err(TemplateError::InvalidName(_))));
    }

    #[test]
    fn test_bindings_from_non_object_is_empty() {
        assert!(bindings(json!(["a"])).is_empty());
        assert_eq!(bindings(json!({"a": 1})).len(), 1);
    }
}
