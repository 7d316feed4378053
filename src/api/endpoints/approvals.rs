//! Approval queue endpoints for staff review.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, MAX_LIMIT};
use crate::db::repository;
use crate::models::enums::ApprovalStatus;
use crate::models::ApprovalEntry;

#[derive(Debug, Default, Deserialize)]
pub struct ApprovalQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub staff_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `GET /api/v1/approvals?status=`: defaults to PENDING, oldest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(q): Query<ApprovalQuery>,
) -> Result<Json<Vec<ApprovalEntry>>, ApiError> {
    let status = match q.status.as_deref() {
        None => ApprovalStatus::Pending,
        Some(raw) => ApprovalStatus::from_str(&raw.to_uppercase())
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };
    let entries = ctx
        .core
        .db
        .with_conn(|conn| repository::list_approvals(conn, status, MAX_LIMIT))?;
    Ok(Json(entries))
}

/// `POST /api/v1/approvals/:id/approve`
pub async fn approve(
    State(ctx): State<ApiContext>,
    Path(queue_id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ApprovalEntry>, ApiError> {
    resolve(&ctx, &queue_id, ApprovalStatus::Approved, req)
}

/// `POST /api/v1/approvals/:id/reject`
pub async fn reject(
    State(ctx): State<ApiContext>,
    Path(queue_id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ApprovalEntry>, ApiError> {
    resolve(&ctx, &queue_id, ApprovalStatus::Rejected, req)
}

fn resolve(
    ctx: &ApiContext,
    queue_id: &str,
    status: ApprovalStatus,
    req: ResolveRequest,
) -> Result<Json<ApprovalEntry>, ApiError> {
    let staff_id = req.staff_id.trim();
    if staff_id.is_empty() {
        return Err(ApiError::BadRequest("staff_id is required".into()));
    }

    let entry = ctx.core.db.with_conn(|conn| {
        repository::resolve_approval(conn, queue_id, status, staff_id, req.notes.as_deref())
    })?;

    tracing::info!(
        queue_id = %entry.queue_id,
        patient_id = %entry.patient_id,
        status = %entry.status,
        staff_id = %staff_id,
        "Approval resolved"
    );
    Ok(Json(entry))
}
