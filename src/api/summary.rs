use axum::{Json, extract::State};
use serde::Serialize;

use super::{ApiError, AppState};
use crate::aggregate::TagCount;
use crate::record::round_to;

/// `top_tags` serializes as `[["tag", count], ...]`.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub total_reviews: u64,
    pub top_tags: Vec<TagCount>,
    pub avg_processing_time: f64,
}

/// GET /summary
pub async fn get_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = state.service.summary()?;
    Ok(Json(SummaryResponse {
        total_reviews: summary.total_reviews,
        top_tags: summary.top_tags,
        avg_processing_time: round_to(summary.avg_processing_time, 2),
    }))
}
