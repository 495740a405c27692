pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::agents::handlers;
use crate::state::AppState;

/// Resume PDFs routinely exceed axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/pipeline/run", post(handlers::handle_run))
        .route("/api/v1/pipeline/run-text", post(handlers::handle_run_text))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
