//! IMDG MSDS Analyzer Service
//!
//! Upload a Material Safety Data Sheet PDF and receive an IMDG dangerous
//! goods classification, packaging guidance and loading decision produced by
//! a hosted chat model over the document's text.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub mod analyzer;
pub mod chunking;
pub mod extraction;
pub mod gate;
pub mod generator;
pub mod handlers;
pub mod llm_client;
pub mod metrics;
pub mod middleware;
pub mod pages;
pub mod prompts;
pub mod retrieval;
pub mod routes;
pub mod session;
pub mod state;
pub mod uploads;

pub use state::AppState;

use middleware::{auth_middleware, request_id_middleware, session_middleware};

pub fn create_app(state: AppState) -> Router {
    let config = &state.config.server;
    // Multipart framing on top of the largest accepted file.
    let body_limit = config.max_request_size + 64 * 1024;
    let timeout = Duration::from_secs(config.timeout_seconds);

    routes::create_routes()
        .layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(axum::middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(TimeoutLayer::new(timeout))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
