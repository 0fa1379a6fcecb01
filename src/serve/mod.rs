//! HTTP serving layer.
//!
//! A small axum app: `GET /health` for liveness and `POST /api/scan` for
//! scoring. The model is loaded once before the router exists; handlers
//! share it through [`AppState`] and never mutate it.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::features::UrlFeatureExtractor;
use crate::predictor::Predictor;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<UrlFeatureExtractor>,
    pub predictor: Predictor,
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/scan", post(handlers::scan))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
