pub mod health;

use axum::{
    response::Html,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::handle_analyze;
use crate::compile::handlers::handle_compile;
use crate::refine::handlers::handle_refine;
use crate::state::AppState;
use crate::tailor::handlers::handle_tailor;

/// Single-page form UI, embedded at build time.
const INDEX_HTML: &str = include_str!("../../static/index.html");

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health::health_handler))
        .route("/api/tailor", post(handle_tailor))
        .route("/api/tailor/refine", post(handle_refine))
        .route("/api/compile", post(handle_compile))
        .route("/api/analyze", post(handle_analyze))
        .with_state(state)
}
