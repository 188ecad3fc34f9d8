//! Two-pass template rendering.
//!
//! Pass 1 replaces `{{name}}` placeholders whose name is bound and leaves
//! unbound placeholders verbatim. Pass 2 resolves `{{#if <expr>}}...{{/if}}`
//! blocks against the same bindings. Blocks do not nest: each opening marker
//! pairs with the first closing marker after it. A `null` binding renders as
//! the empty string, not as the text `null`.
//!
//! Condition grammar, checked in this order:
//! - `a || b || ...` true if any part is true
//! - `a && b && ...` true if every part is true
//! - `name == "literal"` / `name === "literal"` string equality
//! - `name` truthiness of a bound value
//! - anything else is false

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::metrics::TemplateMetrics;

use super::store::TemplateStore;
use super::types::{Bindings, TemplateResult};

lazy_static! {
    static ref VARIABLE: Regex = Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap();
    static ref CONDITIONAL: Regex =
        Regex::new(r"\{\{#if\s+(.+?)\}\}([\s\S]*?)\{\{/if\}\}").unwrap();
    static ref EQUALITY: Regex =
        Regex::new(r#"^([A-Za-z0-9_]+)\s*===?\s*["'](.+?)["']$"#).unwrap();
}

/// Renders catalog templates by name
#[derive(Clone)]
pub struct Renderer {
    store: Arc<TemplateStore>,
}

impl Renderer {
    pub fn new(store: Arc<TemplateStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<TemplateStore> {
        &self.store
    }

    /// Load `name` and render it with `bindings`.
    ///
    /// Fails only when the template cannot be loaded.
    pub async fn render(&self, name: &str, bindings: &Bindings) -> TemplateResult<String> {
        let content = self.store.load(name).await?;
        let rendered = render_template(&content, bindings);

        TemplateMetrics::record_render(name);
        tracing::debug!(template = name, bytes = rendered.len(), "Template rendered");

        Ok(rendered)
    }
}

/// Apply both rendering passes to raw template text
pub fn render_template(content: &str, bindings: &Bindings) -> String {
    let substituted = substitute_variables(content, bindings);
    resolve_conditionals(&substituted, bindings)
}

/// Replace bound `{{name}}` placeholders in a single scan
pub fn substitute_variables(content: &str, bindings: &Bindings) -> String {
    VARIABLE
        .replace_all(content, |caps: &Captures| match bindings.get(&caps[1]) {
            Some(value) => value_to_string(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Keep or drop every `{{#if <expr>}}...{{/if}}` region
pub fn resolve_conditionals(content: &str, bindings: &Bindings) -> String {
    CONDITIONAL
        .replace_all(content, |caps: &Captures| {
            if evaluate_condition(&caps[1], bindings) {
                caps[2].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// Evaluate a condition expression against bindings
pub fn evaluate_condition(condition: &str, bindings: &Bindings) -> bool {
    let condition = condition.trim();

    if condition.contains("||") {
        return condition
            .split("||")
            .any(|part| evaluate_condition(part, bindings));
    }

    if condition.contains("&&") {
        return condition
            .split("&&")
            .all(|part| evaluate_condition(part, bindings));
    }

    if let Some(caps) = EQUALITY.captures(condition) {
        return matches!(
            bindings.get(&caps[1]),
            Some(Value::String(s)) if s.as_str() == &caps[2]
        );
    }

    bindings.get(condition).map(is_truthy).unwrap_or(false)
}

/// String form of a bound value
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // Arrays and objects render as compact JSON
        _ => value.to_string(),
    }
}

/// Truthiness of a bound value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
