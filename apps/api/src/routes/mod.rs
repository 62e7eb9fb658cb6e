pub mod health;

use axum::{
    routing::{get, put},
    Router,
};

use crate::cv::handlers;
use crate::state::AppState;
use crate::templates::handlers::handle_list_templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(handle_list_templates))
        .route(
            "/api/v1/cvs",
            get(handlers::handle_list_cvs).post(handlers::handle_create_cv),
        )
        .route("/api/v1/cvs/:id", get(handlers::handle_get_cv))
        .route("/api/v1/cvs/:id/draft", put(handlers::handle_save_draft))
        .route(
            "/api/v1/cvs/:id/autosave",
            get(handlers::handle_autosave_status),
        )
        .route("/api/v1/cvs/:id/health", get(handlers::handle_cv_health))
        .with_state(state)
}
