//! HTTP front end for the chunked PDF pipeline.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use state::AppState;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION]);
    let body_limit = state.config.server.max_request_bytes();

    Router::new()
        .route("/generate-pdf", post(api::generate_pdf).options(api::preflight))
        .route("/health", get(api::health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
