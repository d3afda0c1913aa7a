//! Shared helpers for the API tests.

use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum_test::{TestRequest, TestServer};
use careflow_types::{ApiResponse, AuthSession};
use config::Config;
use tempfile::TempDir;

use crate::api::router::ApiRoutes;
use crate::app_state::{AppState, SharedAppState};
use crate::settings::config::Settings;

pub const ADMIN: (&str, &str) = ("admin@careflow.test", "admin-password");
pub const DOCTOR: (&str, &str) = ("doctor@careflow.test", "doctor-password");
pub const NURSE: (&str, &str) = ("nurse@careflow.test", "nurse-password");
pub const LAB: (&str, &str) = ("lab@careflow.test", "lab-password");

/// Loads `tests/test_settings` with the policy file placed in a fresh
/// temporary directory. The directory must outlive the state.
pub fn test_settings(overrides: &[(&str, &str)]) -> (Settings, TempDir) {
    let dir = TempDir::new().unwrap();
    let policy_path = dir.path().join("rbac").join("policy.yaml");

    let mut builder = Config::builder()
        .add_source(config::File::with_name("tests/test_settings"))
        .set_override("rbac.policy_path", policy_path.to_string_lossy().to_string())
        .unwrap();
    for (key, value) in overrides {
        builder = builder.set_override(*key, *value).unwrap();
    }

    let settings: Settings = builder.build().unwrap().try_deserialize().unwrap();
    (settings, dir)
}

pub async fn create_test_app_state() -> (SharedAppState, TempDir) {
    create_test_app_state_with(&[]).await
}

pub async fn create_test_app_state_with(
    overrides: &[(&str, &str)],
) -> (SharedAppState, TempDir) {
    let (settings, dir) = test_settings(overrides);
    let state = AppState::from_settings(settings, crate::stop_flag::StopFlag::new())
        .await
        .expect("Failed to build test app state");
    (state, dir)
}

pub struct TestApp {
    pub server: TestServer,
    pub state: SharedAppState,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_overrides(&[]).await
    }

    pub async fn with_overrides(overrides: &[(&str, &str)]) -> Self {
        let (state, dir) = create_test_app_state_with(overrides).await;
        let server = TestServer::new(ApiRoutes::create(state.clone())).unwrap();
        Self {
            server,
            state,
            _dir: dir,
        }
    }

    pub async fn login(&self, (email, password): (&str, &str)) -> AuthSession {
        let response = self
            .server
            .post("/api/v1/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .await;
        assert_eq!(
            response.status_code(),
            200,
            "login of {} failed: {}",
            email,
            response.text()
        );

        let body: ApiResponse<AuthSession> = response.json();
        body.data.unwrap()
    }
}

pub fn bearer(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}
