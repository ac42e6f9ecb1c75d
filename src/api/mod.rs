//! HTTP surface: `POST /analyze`, `GET /summary`, `GET /health`.

pub mod analyze;
pub mod error;
pub mod health;
pub mod summary;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::service::ReviewService;
pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewService>,
}

impl AppState {
    pub fn new(service: ReviewService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze::analyze_review))
        .route("/summary", get(summary::get_summary))
        .route("/health", get(health::health_check))
        .with_state(state)
}
