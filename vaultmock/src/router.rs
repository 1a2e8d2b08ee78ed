//! HTTP router for the dev host

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use vaultmock_accounts::{mount_router, MountState};

/// Create the main application router
pub fn create_router(state: Arc<MountState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/sys/health", get(health_check))
        .merge(mount_router(state))
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"initialized": true, "sealed": false, "standby": false}"#,
    )
}
