use axum::{debug_handler, extract::State, response::IntoResponse, Json};
use careflow_core::api::ServerInfo;
use careflow_types::{ApiResponse, Permission};

use crate::app_state::SharedAppState;

#[utoipa::path(
    get,
    path = "/api/v1/info",
    responses(
    (status = 200, description = "Some global info of the running server.", body = ServerInfo)
    )
)]
#[debug_handler]
pub async fn info_handler(State(state): State<SharedAppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(ServerInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        allow_registration: state.settings.api.allow_registration,
        permission_count: Permission::all().len(),
        role_count: state.auth_service.role_count().await,
    }))
}
