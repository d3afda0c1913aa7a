use axum::{response::IntoResponse, Extension, Json};
use careflow_core::admin::responses::{CategoryInfo, PermissionsListResponse};
use careflow_types::{ApiResponse, Permission, PermissionCategory, PermissionInfo};
use tracing::info;

use crate::api::bearer_auth::CurrentUser;

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/permissions",
    responses(
        (status = 200, description = "The permission catalog grouped by category", body = PermissionsListResponse),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - access_system_settings required"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn list_permissions_handler(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    info!("Admin listing permissions for user: {}", user.profile.email);

    let response = PermissionsListResponse {
        permissions: Permission::all()
            .iter()
            .copied()
            .map(PermissionInfo::from)
            .collect(),
        categories: PermissionCategory::all()
            .iter()
            .copied()
            .map(CategoryInfo::from)
            .collect(),
    };

    Json(ApiResponse::ok(response))
}
