use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use careflow_core::admin::requests::{
    CheckAccessRequest, CreateRoleRequest, CreateUserRequest, DisablePermissionsRequest,
    UpdateUserRoleRequest, UpdateUserStatusRequest,
};
use careflow_core::admin::responses::{
    CategoryInfo, CheckAccessResponse, NavigationResponse, PermissionsListResponse,
    RolesListResponse, UserSummary, UsersListResponse,
};
use careflow_core::api::ServerInfo;
use careflow_core::authorization::{AccessRequirement, CheckMode, NavigationItem, RouteDecision};
use careflow_types::{
    AuthSession, LoginRequest, LogoutRequest, Permission, PermissionCategory, PermissionInfo,
    RefreshRequest, RegisterRequest, RoleInfo, TokenPair, UserProfile,
};

use utoipa::openapi::security::SecurityScheme;
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers::access::{
    __path_check_access_handler, __path_navigation_handler, __path_route_access_handler,
    check_access_handler, navigation_handler, route_access_handler,
};
use crate::api::handlers::admin::permissions::{
    __path_list_permissions_handler, list_permissions_handler,
};
use crate::api::handlers::admin::roles::{
    __path_create_role_handler, __path_list_roles_handler, create_role_handler,
    list_roles_handler,
};
use crate::api::handlers::admin::users::{
    __path_create_user_handler, __path_list_users_handler,
    __path_update_disabled_permissions_handler, __path_update_user_role_handler,
    __path_update_user_status_handler, create_user_handler, list_users_handler,
    update_disabled_permissions_handler, update_user_role_handler, update_user_status_handler,
};
use crate::api::handlers::auth::{
    __path_login_handler, __path_logout_handler, __path_me_handler, __path_refresh_token_handler,
    __path_register_handler, login_handler, logout_handler, me_handler, refresh_token_handler,
    register_handler,
};
use crate::api::handlers::health::{
    HealthStatus, __path_health_checker_handler, health_checker_handler,
};
use crate::api::handlers::info::{__path_info_handler, info_handler};
use crate::app_state::SharedAppState;

use super::bearer_auth::auth;
use super::error::AppError;
use super::middleware::authorization::{require_access, require_permission};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_checker_handler,
        info_handler,
        login_handler,
        register_handler,
        refresh_token_handler,
        logout_handler,
        me_handler,
        navigation_handler,
        check_access_handler,
        route_access_handler,
        list_permissions_handler,
        list_roles_handler,
        create_role_handler,
        list_users_handler,
        create_user_handler,
        update_user_role_handler,
        update_user_status_handler,
        update_disabled_permissions_handler,
    ),
    components(
        schemas(
            HealthStatus, ServerInfo, LoginRequest, RegisterRequest, RefreshRequest,
            LogoutRequest, TokenPair, AuthSession, UserProfile, RoleInfo, Permission,
            PermissionCategory, PermissionInfo, CategoryInfo, CheckMode, CheckAccessRequest,
            CheckAccessResponse, NavigationItem, NavigationResponse, RouteDecision,
            PermissionsListResponse, RolesListResponse, CreateRoleRequest, CreateUserRequest,
            UpdateUserRoleRequest, UpdateUserStatusRequest, DisablePermissionsRequest,
            UserSummary, UsersListResponse
        )
    ),
    tags(
        (name = "careflow-service", description = "careflow access control api")
    ),
    modifiers(&SecurityAddon)
)]
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        )
    }
}

struct ApiDoc;

impl utoipa::OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        SecurityAddon::openapi()
    }
}

async fn not_found() -> AppError {
    AppError::NotFound
}

pub struct ApiRoutes;

impl ApiRoutes {
    pub fn create(state: SharedAppState) -> Router {
        let api = ApiDoc::openapi();
        let authenticated_router = Router::new()
            .route("/api/v1/auth/logout", post(logout_handler))
            .route("/api/v1/auth/me", get(me_handler))
            .route(
                "/api/v1/authenticated/navigation",
                get(navigation_handler),
            )
            .route(
                "/api/v1/authenticated/access/check",
                post(check_access_handler),
            )
            .route(
                "/api/v1/authenticated/access/route",
                get(route_access_handler),
            )
            // Admin routes, each guarded by its own permission
            .route(
                "/api/v1/authenticated/admin/permissions",
                get(list_permissions_handler)
                    .layer(middleware::from_fn(require_permission(Permission::AccessSystemSettings))),
            )
            .route(
                "/api/v1/authenticated/admin/roles",
                get(list_roles_handler)
                    .layer(middleware::from_fn(require_access(AccessRequirement::any_of(&[
                        Permission::ViewAllUsers,
                        Permission::ModifyUserRoles,
                    ]))))
                    .merge(
                        post(create_role_handler).layer(middleware::from_fn(
                            require_permission(Permission::AccessSystemSettings),
                        )),
                    ),
            )
            .route(
                "/api/v1/authenticated/admin/users",
                get(list_users_handler)
                    .layer(middleware::from_fn(require_permission(Permission::ViewAllUsers)))
                    .merge(
                        post(create_user_handler)
                            .layer(middleware::from_fn(require_permission(Permission::CreateUsers))),
                    ),
            )
            .route(
                "/api/v1/authenticated/admin/users/{user_id}/role",
                put(update_user_role_handler)
                    .layer(middleware::from_fn(require_permission(Permission::ModifyUserRoles))),
            )
            .route(
                "/api/v1/authenticated/admin/users/{user_id}/status",
                put(update_user_status_handler).layer(middleware::from_fn(require_permission(
                    Permission::SuspendActivateAccounts,
                ))),
            )
            .route(
                "/api/v1/authenticated/admin/users/{user_id}/disabled-permissions",
                put(update_disabled_permissions_handler)
                    .layer(middleware::from_fn(require_permission(Permission::ModifyUserRoles))),
            )
            // Every route above needs a valid bearer token
            .route_layer(middleware::from_fn_with_state(state.clone(), auth));

        let public_router = Router::new()
            .route("/api/v1/health", get(health_checker_handler))
            .route("/api/v1/info", get(info_handler))
            .route("/api/v1/auth/login", post(login_handler))
            .route("/api/v1/auth/register", post(register_handler))
            .route("/api/v1/auth/refresh-token", post(refresh_token_handler))
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()));

        Router::new()
            .merge(authenticated_router)
            .merge(public_router)
            .fallback(not_found)
            .with_state(state)
    }
}
