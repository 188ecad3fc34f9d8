//! API layer - HTTP endpoint handlers organized by domain.

mod export;
mod extract;
mod health;
mod legacy;
mod metrics;
mod questions;
mod routes;
mod sessions;
mod templates;
mod wizard;

// Re-export all handlers for use in server/app.rs
pub use export::download_export;
pub use extract::{non_blank, parse_id, ApiJson};
pub use health::{health, HealthResponse};
pub use legacy::{
    analyze_idea, complete_step, generate_plan, get_plan, get_step, get_steps, uncomplete_step,
    update_product_vision, validate_idea, ApiResponse,
};
pub use metrics::prometheus_metrics;
pub use questions::{list_base_questions, list_categories, validate_answers, CategoryInfo};
pub use routes::api_routes;
pub use sessions::{
    create_session, delete_session, get_session, reset_session, session_stats, update_session,
};
pub use templates::{clear_template_cache, list_templates};
pub use wizard::{
    analyze_category, generate_adaptive_questions, generate_debug_prompt, generate_prd,
    generate_prompts, CategoryResponse,
};
