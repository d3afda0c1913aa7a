use axum::{extract::Query, response::IntoResponse, Extension, Json};
use careflow_core::admin::requests::CheckAccessRequest;
use careflow_core::admin::responses::{CheckAccessResponse, NavigationResponse};
use careflow_core::authorization::{
    check_permissions, default_navigation, visible_navigation, RouteDecision, RouteTable,
};
use careflow_types::{ApiResponse, Permission};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::{bearer_auth::CurrentUser, error::AppError};

/// Parses permission names, rejecting the request on the first unknown one.
pub fn parse_permissions(names: &[String]) -> Result<Vec<Permission>, AppError> {
    names
        .iter()
        .map(|name| {
            Permission::from_str(name)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown permission: {}", name)))
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/navigation",
    responses(
    (status = 200, description = "Sidebar entries visible to the current user", body = NavigationResponse),
    (status = 401, description = "Access token is missing or invalid"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn navigation_handler(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    let items = visible_navigation(&default_navigation(), &user.profile.permissions);
    Json(ApiResponse::ok(NavigationResponse { items }))
}

#[utoipa::path(
    post,
    path = "/api/v1/authenticated/access/check",
    request_body = CheckAccessRequest,
    responses(
    (status = 200, description = "Result of the permission check", body = CheckAccessResponse),
    (status = 400, description = "Unknown permission name"),
    (status = 401, description = "Access token is missing or invalid"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn check_access_handler(
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CheckAccessRequest>,
) -> Result<impl IntoResponse, AppError> {
    let required = parse_permissions(&request.permissions)?;
    let granted = &user.profile.permissions;

    let allowed = required.is_empty() || check_permissions(granted, &required, request.mode);
    let missing = required
        .iter()
        .filter(|p| !granted.contains(p))
        .copied()
        .collect();

    Ok(Json(ApiResponse::ok(CheckAccessResponse {
        allowed,
        mode: request.mode,
        missing,
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RouteQuery {
    /// Page path to evaluate, e.g. `/patients/42`
    pub path: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/authenticated/access/route",
    params(RouteQuery),
    responses(
    (status = 200, description = "Routing decision for the current user", body = RouteDecision),
    (status = 401, description = "Access token is missing or invalid"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn route_access_handler(
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<RouteQuery>,
) -> impl IntoResponse {
    let decision = RouteTable::application().decide(&query.path, Some(&user.profile));
    Json(ApiResponse::ok(decision))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_permissions() {
        let parsed = parse_permissions(&[
            "view_lab_orders".to_string(),
            " EDIT_LAB_ORDERS".to_string(),
        ])
        .unwrap();
        assert_eq!(parsed, vec![Permission::ViewLabOrders, Permission::EditLabOrders]);

        assert_eq!(
            parse_permissions(&["view_lab_orders".to_string(), "fly".to_string()]).unwrap_err(),
            AppError::BadRequest("Unknown permission: fly".to_string())
        );
    }
}
