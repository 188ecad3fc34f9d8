use axum::{
    routing::{get, post, put},
    Router,
};

use crate::server::AppState;

use super::export::download_export;
use super::health::health;
use super::legacy::{
    analyze_idea, complete_step, generate_plan, get_plan, get_step, get_steps, uncomplete_step,
    update_product_vision,
};
use super::metrics::prometheus_metrics;
use super::questions::{list_base_questions, list_categories, validate_answers};
use super::sessions::{
    create_session, delete_session, get_session, reset_session, session_stats, update_session,
};
use super::templates::{clear_template_cache, list_templates};
use super::wizard::{
    analyze_category, generate_adaptive_questions, generate_debug_prompt, generate_prd,
    generate_prompts,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api",
            Router::new()
                // Sessions
                .route("/sessions", post(create_session))
                .route(
                    "/sessions/{id}",
                    get(get_session).put(update_session).delete(delete_session),
                )
                .route("/sessions/{id}/reset", post(reset_session))
                .route("/stats", get(session_stats))
                // Questions
                .route("/questions/base", get(list_base_questions))
                .route("/questions/categories", get(list_categories))
                .route("/questions/validate", post(validate_answers))
                // Generation
                .route("/analyze-category", post(analyze_category))
                .route(
                    "/generate-adaptive-questions",
                    post(generate_adaptive_questions),
                )
                .route("/generate-prd", post(generate_prd))
                .route("/generate-prompts", post(generate_prompts))
                .route("/generate-debug-prompt", post(generate_debug_prompt))
                // Export
                .route("/export/{id}", get(download_export))
                // Legacy projects and steps
                .route("/analyze-idea", post(analyze_idea))
                .route("/analyze-idea/{id}", put(update_product_vision))
                .route("/generate-plan", post(generate_plan))
                .route("/generate-plan/{id}", get(get_plan))
                .route("/steps/{id}", get(get_steps))
                .route("/steps/step/{id}", get(get_step))
                .route("/steps/{id}/complete", post(complete_step))
                .route("/steps/{id}/uncomplete", post(uncomplete_step))
                // Template diagnostics
                .route("/templates", get(list_templates))
                .route("/templates/cache/clear", post(clear_template_cache)),
        )
}
