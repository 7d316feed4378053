//! Staff dashboard notifications.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DEFAULT_LIMIT, MAX_LIMIT};
use crate::db::repository;
use crate::models::Notification;

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub recipient: Option<String>,
    pub limit: Option<usize>,
}

/// `GET /api/v1/notifications?recipient=`: newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(q): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let notifications = ctx.core.db.with_conn(|conn| {
        repository::list_notifications(conn, q.recipient.as_deref(), limit)
    })?;
    Ok(Json(notifications))
}
