use axum::{debug_handler, response::IntoResponse, Json};
use careflow_types::ApiResponse;
use serde::Serialize;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
    (status = 200, description = "Server is up", body = HealthStatus)
    )
)]
#[debug_handler]
pub async fn health_checker_handler() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
