//! Interaction memory endpoint.

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, LimitQuery};
use crate::db::repository;
use crate::models::InteractionTurn;

/// `GET /api/v1/interactions/:patient_id?limit=`: newest first.
pub async fn recent(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<InteractionTurn>>, ApiError> {
    let turns = ctx
        .core
        .db
        .with_conn(|conn| repository::recent_interactions(conn, &patient_id, q.resolved()))?;
    Ok(Json(turns))
}
