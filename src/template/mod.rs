//! Prompt template system.
//!
//! This module provides:
//! - File-backed template storage with an in-memory cache
//! - Two-pass rendering: `{{variable}}` substitution, then `{{#if ...}}` blocks
//! - Optional hot reload that invalidates cache entries on file changes
//!
//! # Example
//!
//! ```ignore
//! let store = create_template_store("prompts");
//! let renderer = Renderer::new(store);
//!
//! let vars = bindings(json!({
//!     "prd": "# My product",
//!     "goal": "Портфолио"
//! }));
//!
//! let prompt = renderer.render("planning-prompt", &vars).await?;
//! ```

mod render;
mod store;
mod types;
mod watcher;

pub use render::{
    evaluate_condition, is_truthy, render_template, resolve_conditionals, substitute_variables,
    value_to_string, Renderer,
};
pub use store::{create_template_store, template_name, TemplateStore};
pub use types::{bindings, validate_name, Bindings, TemplateError, TemplateResult};
pub use watcher::{
    create_template_watcher, diff_snapshots, scan_templates, FileStamp, NoopWatcher,
    PollingWatcher, Snapshot, TemplateChange, TemplateWatcher,
};
