pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route("/api/v1/sessions/:id", get(handlers::handle_get_session))
        .route(
            "/api/v1/sessions/:id/transcribe",
            post(handlers::handle_transcribe),
        )
        .route(
            "/api/v1/sessions/:id/diagnose",
            post(handlers::handle_diagnose),
        )
        .route(
            "/api/v1/sessions/:id/cases/:index/strategies",
            get(handlers::handle_strategies),
        )
        .route(
            "/api/v1/sessions/:id/cases/:index/questions",
            get(handlers::handle_questions),
        )
        .route(
            "/api/v1/sessions/:id/cases/:index/template",
            post(handlers::handle_select_template),
        )
        .route(
            "/api/v1/sessions/:id/template/download",
            get(handlers::handle_download_template),
        )
        .route(
            "/api/v1/sessions/:id/responses",
            post(handlers::handle_save_responses),
        )
        .route("/api/v1/sessions/:id/back", post(handlers::handle_back))
        .with_state(state)
}
