use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bideval_engine::{
    default_criteria, BidEvaluator, BidId, ComparisonReport, EvaluationReport, EvaluationRequest, ScoringCriterion,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ApiError;
use crate::metrics;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    pub request: EvaluationRequest,
    pub bid_ids: Vec<BidId>,
}

pub async fn health_check_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn default_criteria_handler() -> Json<Vec<ScoringCriterion>> {
    Json(default_criteria())
}

pub async fn evaluate_handler(
    Extension(evaluator): Extension<Arc<BidEvaluator>>,
    payload: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Result<Json<EvaluationReport>, ApiError> {
    let Json(request) = payload?;
    validate_request(&request)?;

    let started = Instant::now();
    let report = evaluator.evaluate(&request);
    metrics::record_evaluation("evaluate", request.bids.len(), started.elapsed().as_secs_f64());
    for score in &report.scores {
        metrics::record_weighted_score(score.weighted_score);
    }

    Ok(Json(report))
}

pub async fn compare_handler(
    Extension(evaluator): Extension<Arc<BidEvaluator>>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<ComparisonReport>, ApiError> {
    let Json(body) = payload?;
    validate_request(&body.request)?;
    if body.bid_ids.is_empty() {
        return Err(ApiError::BadRequest("bid_ids must not be empty".to_string()));
    }

    let started = Instant::now();
    let report = evaluator.compare(&body.request, &body.bid_ids)?;
    metrics::record_evaluation("compare", body.request.bids.len(), started.elapsed().as_secs_f64());

    Ok(Json(report))
}

pub async fn metrics_handler() -> Result<impl IntoResponse, ApiError> {
    let body = metrics::render()?;
    Ok((StatusCode::OK, [("content-type", "text/plain; version=0.0.4")], body))
}

/// Criterion weights are checked while decoding; the budget is checked here.
fn validate_request(request: &EvaluationRequest) -> Result<(), ApiError> {
    if let Some(limit) = request.budget_limit {
        if !limit.is_finite() || limit < 0.0 {
            return Err(ApiError::BadRequest(format!("budget_limit must be a non-negative number, got {}", limit)));
        }
    }
    Ok(())
}
