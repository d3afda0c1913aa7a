use careflow_core::admin::responses::{CheckAccessResponse, NavigationResponse};
use careflow_core::authorization::RouteDecision;
use careflow_types::{ApiResponse, AuthSession, Permission, TokenPair, UserProfile};
use serde_json::json;

use crate::api::test_utils::{bearer, TestApp, ADMIN, DOCTOR, LAB, NURSE};

#[tokio::test]
async fn test_health_and_info_are_public() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/v1/health").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");

    let response = app.server.get("/api/v1/info").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["permissionCount"], 58);
    assert_eq!(body["data"]["roleCount"], 7);
    assert_eq!(body["data"]["allowRegistration"], true);
}

#[tokio::test]
async fn test_login_returns_profile_with_role_permissions() {
    let app = TestApp::new().await;
    let session = app.login(DOCTOR).await;

    assert_eq!(session.user.email, DOCTOR.0);
    assert_eq!(session.user.role.name, "doctor");
    assert_eq!(session.expires_in, 60);
    assert!(session.user.permissions.contains(&Permission::CreatePrescriptions));
    assert!(!session.user.permissions.contains(&Permission::CreateUsers));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": DOCTOR.0, "password": "not-the-password" }))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_me_requires_a_token() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/v1/auth/me").await;
    assert_eq!(response.status_code(), 401);

    let response = bearer(app.server.get("/api/v1/auth/me"), "garbage").await;
    assert_eq!(response.status_code(), 401);

    let session = app.login(NURSE).await;
    let response = bearer(app.server.get("/api/v1/auth/me"), &session.access_token).await;
    assert_eq!(response.status_code(), 200);
    let body: ApiResponse<UserProfile> = response.json();
    assert_eq!(body.data.unwrap().role.name, "nurse");
}

#[tokio::test]
async fn test_refresh_rotates_the_token_pair() {
    let app = TestApp::new().await;
    let session = app.login(LAB).await;

    let response = app
        .server
        .post("/api/v1/auth/refresh-token")
        .json(&json!({ "refreshToken": session.refresh_token }))
        .await;
    assert_eq!(response.status_code(), 200);
    let tokens: ApiResponse<TokenPair> = response.json();
    let tokens = tokens.data.unwrap();
    assert_ne!(tokens.access_token, session.access_token);

    // The old pair is spent
    let response = bearer(app.server.get("/api/v1/auth/me"), &session.access_token).await;
    assert_eq!(response.status_code(), 401);
    let response = app
        .server
        .post("/api/v1/auth/refresh-token")
        .json(&json!({ "refreshToken": session.refresh_token }))
        .await;
    assert_eq!(response.status_code(), 401);

    let response = bearer(app.server.get("/api/v1/auth/me"), &tokens.access_token).await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let app = TestApp::new().await;
    let session = app.login(DOCTOR).await;

    let response = bearer(app.server.post("/api/v1/auth/logout"), &session.access_token)
        .json(&json!({ "refreshToken": session.refresh_token }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = bearer(app.server.get("/api/v1/auth/me"), &session.access_token).await;
    assert_eq!(response.status_code(), 401);
    let response = app
        .server
        .post("/api/v1/auth/refresh-token")
        .json(&json!({ "refreshToken": session.refresh_token }))
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_logout_without_body() {
    let app = TestApp::new().await;
    let session = app.login(NURSE).await;

    let response = bearer(app.server.post("/api/v1/auth/logout"), &session.access_token).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(app.state.sessions.active_count().await, 0);
}

#[tokio::test]
async fn test_register_creates_a_patient() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": "ada@example.com",
            "password": "analytical",
            "firstName": "Ada",
            "lastName": "Lovelace",
        }))
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());

    let body: ApiResponse<AuthSession> = response.json();
    let session = body.data.unwrap();
    assert_eq!(session.user.role.name, "patient");
    assert!(session.user.permissions.contains(&Permission::ViewOwnDocuments));
    assert!(!session.user.permissions.contains(&Permission::ViewAllPatients));

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": "ADA@example.com",
            "password": "analytical",
            "firstName": "Ada",
            "lastName": "Lovelace",
        }))
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_register_rejects_short_passwords() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": "bob@example.com",
            "password": "short",
            "firstName": "Bob",
            "lastName": "Builder",
        }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Password must be at least 8 characters long");
}

#[tokio::test]
async fn test_register_can_be_disabled() {
    let app = TestApp::with_overrides(&[("api.allow_registration", "false")]).await;

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": "eve@example.com",
            "password": "long enough",
            "firstName": "Eve",
            "lastName": "Example",
        }))
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_navigation_is_filtered_by_permissions() {
    let app = TestApp::new().await;

    let admin = app.login(ADMIN).await;
    let response = bearer(
        app.server.get("/api/v1/authenticated/navigation"),
        &admin.access_token,
    )
    .await;
    let admin_items: ApiResponse<NavigationResponse> = response.json();
    let admin_items = admin_items.data.unwrap().items;

    let lab = app.login(LAB).await;
    let response = bearer(
        app.server.get("/api/v1/authenticated/navigation"),
        &lab.access_token,
    )
    .await;
    let lab_items: ApiResponse<NavigationResponse> = response.json();
    let lab_items = lab_items.data.unwrap().items;

    assert!(lab_items.len() < admin_items.len());
    assert!(lab_items
        .iter()
        .all(|item| item.is_visible(&lab.user.permissions)));
}

#[tokio::test]
async fn test_access_check_any_and_all() {
    let app = TestApp::new().await;
    let session = app.login(LAB).await;

    let response = bearer(
        app.server.post("/api/v1/authenticated/access/check"),
        &session.access_token,
    )
    .json(&json!({ "permissions": ["view_lab_orders", "create_users"], "mode": "any" }))
    .await;
    assert_eq!(response.status_code(), 200);
    let check: ApiResponse<CheckAccessResponse> = response.json();
    let check = check.data.unwrap();
    assert!(check.allowed);
    assert_eq!(check.missing, vec![Permission::CreateUsers]);

    let response = bearer(
        app.server.post("/api/v1/authenticated/access/check"),
        &session.access_token,
    )
    .json(&json!({ "permissions": ["view_lab_orders", "create_users"], "mode": "all" }))
    .await;
    let check: ApiResponse<CheckAccessResponse> = response.json();
    assert!(!check.data.unwrap().allowed);

    let response = bearer(
        app.server.post("/api/v1/authenticated/access/check"),
        &session.access_token,
    )
    .json(&json!({ "permissions": ["teleport"] }))
    .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_route_decisions() {
    let app = TestApp::new().await;
    let session = app.login(LAB).await;

    let response = bearer(
        app.server
            .get("/api/v1/authenticated/access/route")
            .add_query_param("path", "/admin/users"),
        &session.access_token,
    )
    .await;
    assert_eq!(response.status_code(), 200);
    let decision: ApiResponse<RouteDecision> = response.json();
    assert!(matches!(decision.data.unwrap(), RouteDecision::Denied { .. }));

    let response = bearer(
        app.server
            .get("/api/v1/authenticated/access/route")
            .add_query_param("path", "/no/such/page"),
        &session.access_token,
    )
    .await;
    let decision: ApiResponse<RouteDecision> = response.json();
    assert_eq!(
        decision.data.unwrap(),
        RouteDecision::Redirect {
            to: "/dashboard".to_string()
        }
    );
}

#[tokio::test]
async fn test_unknown_api_path_is_json_404() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/v1/nothing-here").await;
    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new().await;

    let response = app.server.get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert!(body["paths"]["/api/v1/auth/login"].is_object());
    assert!(body["components"]["securitySchemes"]["bearerAuth"].is_object());
}
