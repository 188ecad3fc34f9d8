//! Locate JSON payloads inside free-form model output.
//!
//! Spans are greedy: from the first opening bracket to the last closing one,
//! so surrounding prose and markdown fences are dropped.

use serde_json::Value;

/// Text from the first `{` to the last `}`, if any
pub fn object_span(text: &str) -> Option<&str> {
    span(text, '{', '}')
}

/// Text from the first `[` to the last `]`, if any
pub fn array_span(text: &str) -> Option<&str> {
    span(text, '[', ']')
}

fn span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Parse the object span of `text`.
///
/// `None` when there is no span; `Some(Err)` when the span is not valid JSON.
pub fn extract_object(text: &str) -> Option<serde_json::Result<Value>> {
    object_span(text).map(serde_json::from_str)
}

/// Parse the array span of `text`
pub fn extract_array(text: &str) -> Option<serde_json::Result<Vec<Value>>> {
    array_span(text).map(serde_json::from_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_inside_prose() {
        let text = "Вот ответ:\n```json\n{\"category\": \"BOT\", \"confidence\": 0.9}\n```\nГотово";
        let value = extract_object(text).unwrap().unwrap();
        assert_eq!(value, json!({"category": "BOT", "confidence": 0.9}));
    }

    #[test]
    fn test_nested_object_kept_whole() {
        let text = r#"{"a": {"b": 1}}"#;
        assert_eq!(object_span(text), Some(text));
    }

    #[test]
    fn test_array_span() {
        let text = "Questions: [{\"id\": \"q1\"}, {\"id\": \"q2\"}] end";
        let items = extract_array(text).unwrap().unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_no_span() {
        assert!(object_span("no json here").is_none());
        assert!(array_span("] backwards [").is_none());
        assert!(extract_object("").is_none());
    }

    #[test]
    fn test_greedy_span_across_two_objects_fails_to_parse() {
        let text = r#"{"a": 1} and {"b": 2}"#;
        assert!(extract_object(text).unwrap().is_err());
    }
}
