//! HTTP/JSON API

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::service::MixOptService;

pub use error::ApiError;

/// Build the REST router over a shared service
pub fn create_router(service: Arc<MixOptService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/version", get(handlers::version))
        .route("/api/v1/curves", get(handlers::list_curves))
        .route("/api/v1/curves/fit", post(handlers::fit_curves))
        .route(
            "/api/v1/curves/:channel",
            get(handlers::get_curve).delete(handlers::delete_curve),
        )
        .route("/api/v1/optimize", post(handlers::optimize))
        .route("/api/v1/runs/:run_id", get(handlers::get_run))
        .route("/api/v1/allocations/evaluate", post(handlers::evaluate))
        .layer(cors)
        .with_state(service)
}
