#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use bideval_engine::BidEvaluator;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use config::ServiceConfig;
pub use error::ApiError;

/// Builds the service router around a shared, stateless evaluator.
pub fn create_app(evaluator: BidEvaluator) -> Router {
    metrics::init();

    Router::new()
        .route("/health", get(handlers::health_check_handler))
        .route("/criteria/defaults", get(handlers::default_criteria_handler))
        .route("/evaluate", post(handlers::evaluate_handler))
        .route("/compare", post(handlers::compare_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(Extension(Arc::new(evaluator)))
        .layer(TraceLayer::new_for_http())
}
