//! Patient query endpoint: the full decision pipeline.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::orchestrator::QueryOutcome;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub patient_id: String,
    pub text: String,
}

/// `POST /api/v1/query`
pub async fn submit(
    State(ctx): State<ApiContext>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryOutcome>, ApiError> {
    let outcome = ctx
        .core
        .orchestrator
        .process_query(&req.patient_id, &req.text)
        .await?;
    Ok(Json(outcome))
}
