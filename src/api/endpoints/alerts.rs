//! Operational alerts, e.g. emergency pages that could not be delivered.

use axum::extract::{Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, LimitQuery};
use crate::db::repository;
use crate::models::OperationalAlert;

/// `GET /api/v1/alerts`: newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<OperationalAlert>>, ApiError> {
    let alerts = ctx
        .core
        .db
        .with_conn(|conn| repository::list_operational_alerts(conn, q.resolved()))?;
    Ok(Json(alerts))
}
