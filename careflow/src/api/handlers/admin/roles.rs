use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use careflow_core::admin::requests::CreateRoleRequest;
use careflow_core::admin::responses::RolesListResponse;
use careflow_types::{ApiResponse, RoleInfo};
use tracing::info;

use crate::api::{bearer_auth::CurrentUser, error::AppError};
use crate::app_state::SharedAppState;

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/roles",
    responses(
        (status = 200, description = "All roles with their resolved permissions", body = RolesListResponse),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - view_all_users or modify_user_roles required"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn list_roles_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    info!("Admin listing roles for user: {}", user.profile.email);

    let roles = state.auth_service.list_roles().await;
    Json(ApiResponse::ok(RolesListResponse { roles }))
}

#[utoipa::path(
    post,
    path = "/api/v1/authenticated/admin/roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created and persisted", body = RoleInfo),
        (status = 400, description = "Invalid role name or unknown permission"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - access_system_settings required"),
        (status = 409, description = "Role already exists"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn create_role_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!(
        "Admin creating role '{}' for user: {}",
        request.name, user.profile.email
    );

    if request.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Role description cannot be empty".to_string(),
        ));
    }

    let role = state
        .auth_service
        .create_role(&request.name, &request.description, &request.permissions)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(role).with_message("Role created")),
    ))
}
