use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::Value;

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub review_text: String,
    pub tags: Vec<String>,
    pub processing_time: f64,
}

/// POST /analyze
///
/// Body `{"review_text": "..."}`. A missing, non-string or blank
/// `review_text` is rejected with 400 before any tagging happens.
pub async fn analyze_review(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let review_text = payload
        .get("review_text")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Missing review_text".to_string()))?;

    let analyzed = state.service.analyze(review_text).await?;

    Ok(Json(AnalyzeResponse {
        review_text: analyzed.record.text,
        tags: analyzed.record.tags,
        processing_time: analyzed.record.processing_time,
    }))
}
