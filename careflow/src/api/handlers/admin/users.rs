use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use careflow_core::admin::requests::{
    CreateUserRequest, DisablePermissionsRequest, UpdateUserRoleRequest, UpdateUserStatusRequest,
};
use careflow_core::admin::responses::{UserSummary, UsersListResponse};
use careflow_types::{ApiResponse, Permission, RoleName};
use tracing::info;
use uuid::Uuid;

use crate::api::handlers::access::parse_permissions;
use crate::api::{bearer_auth::CurrentUser, error::AppError};
use crate::app_state::SharedAppState;
use crate::services::users::{NewUser, UserRecord};

async fn summary(state: &SharedAppState, user: &UserRecord) -> UserSummary {
    UserSummary {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        role: user.role.clone(),
        is_active: user.is_active,
        disabled_permissions: state.auth_service.disabled_permissions(&user.id).await,
        created_at: user.created_at.to_rfc3339(),
    }
}

async fn find_user(state: &SharedAppState, id: &Uuid) -> Result<UserRecord, AppError> {
    state.users.get(id).await.ok_or(AppError::UserNotFound(*id))
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/admin/users",
    responses(
        (status = 200, description = "All accounts, oldest first", body = UsersListResponse),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - view_all_users required"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn list_users_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    info!("Admin listing users for user: {}", user.profile.email);

    let mut users = Vec::new();
    for record in state.users.list().await {
        users.push(summary(&state, &record).await);
    }

    Json(ApiResponse::ok(UsersListResponse { users }))
}

#[utoipa::path(
    post,
    path = "/api/v1/authenticated/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserSummary),
        (status = 400, description = "Invalid input or unknown role"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - create_users required"),
        (status = 409, description = "Email already registered"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn create_user_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!(
        "Admin {} creating user {} with role {}",
        user.profile.email, request.email, request.role
    );

    // Granting the administrator role needs the right to change roles too
    if request.role == RoleName::Admin.as_str()
        && !user.profile.permissions.contains(&Permission::ModifyUserRoles)
    {
        return Err(AppError::Forbidden(
            "Creating administrators requires modify_user_roles".to_string(),
        ));
    }

    let record = state
        .create_account(NewUser {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            role: request.role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(summary(&state, &record).await).with_message("User created")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/authenticated/admin/users/{user_id}/role",
    params(
        ("user_id" = Uuid, Path, description = "Id of the user")
    ),
    request_body = UpdateUserRoleRequest,
    responses(
        (status = 200, description = "Role changed, open sessions of the user are ended", body = UserSummary),
        (status = 400, description = "Unknown role"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - modify_user_roles required"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn update_user_role_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    find_user(&state, &user_id).await?;
    let role = request.role.trim();

    state.auth_service.assign_role(&user_id, role).await?;
    let record = state.users.set_role(&user_id, role).await?;
    let revoked = state.sessions.revoke_user(&user_id).await;

    info!(
        "Admin {} moved user {} to role {} ({} sessions ended)",
        user.profile.email, record.email, role, revoked
    );

    Ok(Json(
        ApiResponse::ok(summary(&state, &record).await).with_message("Role updated"),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/authenticated/admin/users/{user_id}/status",
    params(
        ("user_id" = Uuid, Path, description = "Id of the user")
    ),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "Account suspended or reactivated", body = UserSummary),
        (status = 400, description = "Administrators cannot suspend themselves"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - suspend_activate_accounts required"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn update_user_status_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    if user_id == user.profile.id && !request.is_active {
        return Err(AppError::BadRequest(
            "You cannot suspend your own account".to_string(),
        ));
    }

    let record = state.users.set_active(&user_id, request.is_active).await?;
    if !record.is_active {
        let revoked = state.sessions.revoke_user(&user_id).await;
        info!(
            "Admin {} suspended user {} ({} sessions ended)",
            user.profile.email, record.email, revoked
        );
    } else {
        info!("Admin {} reactivated user {}", user.profile.email, record.email);
    }

    Ok(Json(
        ApiResponse::ok(summary(&state, &record).await).with_message("Status updated"),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/authenticated/admin/users/{user_id}/disabled-permissions",
    params(
        ("user_id" = Uuid, Path, description = "Id of the user")
    ),
    request_body = DisablePermissionsRequest,
    responses(
        (status = 200, description = "Withheld permissions replaced", body = UserSummary),
        (status = 400, description = "Unknown permission name"),
        (status = 401, description = "Access token is missing or invalid"),
        (status = 403, description = "Insufficient permissions - modify_user_roles required"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn update_disabled_permissions_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<DisablePermissionsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = find_user(&state, &user_id).await?;
    let mut permissions = parse_permissions(&request.permissions)?;
    permissions.sort();
    permissions.dedup();

    state
        .auth_service
        .set_disabled_permissions(&user_id, &permissions)
        .await?;

    info!(
        "Admin {} disabled {} permissions of user {}",
        user.profile.email,
        permissions.len(),
        record.email
    );

    Ok(Json(
        ApiResponse::ok(summary(&state, &record).await)
            .with_message("Disabled permissions updated"),
    ))
}
