//! HTTP router.
//!
//! Returns a composable `Router` with every endpoint nested under `/api/v1`.
//!
//! Layers (outermost → innermost): CORS → tracing → access log → handler.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router over shared core state.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/query", post(endpoints::query::submit))
        .route("/policy/evaluate", post(endpoints::policy::evaluate))
        .route("/patients", post(endpoints::patients::upsert))
        .route("/patients/:id", get(endpoints::patients::detail))
        .route(
            "/interactions/:patient_id",
            get(endpoints::interactions::recent),
        )
        .route("/audit/:patient_id", get(endpoints::audit::by_patient))
        .route("/approvals", get(endpoints::approvals::list))
        .route("/approvals/:id/approve", post(endpoints::approvals::approve))
        .route("/approvals/:id/reject", post(endpoints::approvals::reject))
        .route("/notifications", get(endpoints::notifications::list))
        .route("/alerts", get(endpoints::alerts::list))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access));

    Router::new()
        .nest("/api/v1", routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
