//! Audit trail endpoint. Read-only.

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, LimitQuery};
use crate::db::repository;
use crate::models::AuditRecord;

/// `GET /api/v1/audit/:patient_id?limit=`: newest first.
pub async fn by_patient(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<AuditRecord>>, ApiError> {
    let records = ctx
        .core
        .db
        .with_conn(|conn| repository::query_audit_by_patient(conn, &patient_id, q.resolved()))?;
    Ok(Json(records))
}
