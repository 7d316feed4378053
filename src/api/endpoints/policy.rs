//! Stateless policy evaluation from raw signal values.
//!
//! Evaluates only: nothing is notified, queued or audited.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::PolicyDecision;
use crate::policy::{self, PolicyInput};

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub intent: String,
    pub distress: String,
    #[serde(default)]
    pub repetition_count: i64,
    #[serde(default)]
    pub is_medication_request: bool,
    pub patient_id: String,
}

/// `POST /api/v1/policy/evaluate`
pub async fn evaluate(
    State(ctx): State<ApiContext>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<PolicyDecision>, ApiError> {
    let patient = ctx
        .core
        .db
        .with_conn(|conn| repository::require_patient(conn, &req.patient_id))?;

    let input = PolicyInput::from_raw(
        &req.intent,
        &req.distress,
        req.repetition_count,
        req.is_medication_request,
        patient.context,
    )?;
    Ok(Json(policy::evaluate(&input)?))
}
