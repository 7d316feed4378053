//! Patient registry endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::PatientRecord;

/// `POST /api/v1/patients`: register or replace a patient record.
pub async fn upsert(
    State(ctx): State<ApiContext>,
    Json(record): Json<PatientRecord>,
) -> Result<(StatusCode, Json<PatientRecord>), ApiError> {
    let patient = &record.context;
    if patient.id.trim().is_empty() {
        return Err(ApiError::BadRequest("patient id is required".into()));
    }
    if patient.assigned_nurse_id.trim().is_empty()
        || patient.assigned_physician_id.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "assigned_nurse_id and assigned_physician_id are required".into(),
        ));
    }

    ctx.core
        .db
        .with_conn(|conn| repository::upsert_patient(conn, &record))?;
    tracing::info!(patient_id = %record.context.id, "Patient record stored");
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/v1/patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<PatientRecord>, ApiError> {
    let record = ctx
        .core
        .db
        .with_conn(|conn| repository::require_patient(conn, &id))?;
    Ok(Json(record))
}
