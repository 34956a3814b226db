//! Route handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use mixopt_common::FittedCurve;
use mixopt_genetic::{AllocationEvaluation, OptimizationResult};
use serde_json::{json, Value};
use uuid::Uuid;

use super::ApiError;
use crate::service::{EvaluateRequest, FitRequest, MixOptService, OptimizeRequest};
use crate::SERVICE_VERSION;

type Shared = State<Arc<MixOptService>>;

pub async fn health(State(service): Shared) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "curves": service.curve_count().await,
        "runs": service.run_count(),
    }))
}

pub async fn version() -> Json<Value> {
    Json(json!({
        "service": "mixopt",
        "version": SERVICE_VERSION,
        "engine": mixopt_common::VERSION,
    }))
}

pub async fn fit_curves(
    State(service): Shared,
    Json(request): Json<FitRequest>,
) -> Result<(StatusCode, Json<Vec<FittedCurve>>), ApiError> {
    if request.channels.is_empty() {
        return Err(ApiError::bad_request("at least one channel history is required"));
    }
    let fitted = service.fit_curves(request).await?;
    Ok((StatusCode::CREATED, Json(fitted)))
}

pub async fn list_curves(State(service): Shared) -> Json<Vec<FittedCurve>> {
    Json(service.list_curves().await)
}

pub async fn get_curve(
    State(service): Shared,
    Path(channel): Path<String>,
) -> Result<Json<FittedCurve>, ApiError> {
    Ok(Json(service.get_curve(&channel).await?))
}

pub async fn delete_curve(
    State(service): Shared,
    Path(channel): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.delete_curve(&channel).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn optimize(
    State(service): Shared,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizationResult>, ApiError> {
    let result = service.optimize(request).await?;
    Ok(Json(result.as_ref().clone()))
}

pub async fn get_run(
    State(service): Shared,
    Path(run_id): Path<String>,
) -> Result<Json<OptimizationResult>, ApiError> {
    let run_id = Uuid::parse_str(&run_id)
        .map_err(|e| ApiError::bad_request(format!("invalid run id: {}", e)))?;
    let result = service.get_run(&run_id)?;
    Ok(Json(result.as_ref().clone()))
}

pub async fn evaluate(
    State(service): Shared,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<AllocationEvaluation>, ApiError> {
    Ok(Json(service.evaluate(request).await?))
}
