pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::images::handlers as images;
use crate::portfolio::handlers as portfolio;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Portfolio API
        .route(
            "/api/portfolio",
            get(portfolio::handle_get_own).post(portfolio::handle_save),
        )
        .route("/api/portfolio/:slug", get(portfolio::handle_get_public))
        // Images
        .route(
            "/api/upload",
            post(images::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/images/:id", get(images::handle_get_image))
        .with_state(state)
}
