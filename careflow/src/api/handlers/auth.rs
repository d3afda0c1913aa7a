use axum::{
    body::Bytes, debug_handler, extract::State, http::StatusCode, response::IntoResponse,
    Extension, Json,
};
use careflow_types::{
    ApiResponse, AuthSession, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
    RoleName, TokenPair, UserProfile,
};
use tracing::{debug, info, warn};

use crate::api::{bearer_auth::CurrentUser, error::AppError};
use crate::app_state::SharedAppState;
use crate::services::sessions::IssuedTokens;
use crate::services::users::{NewUser, UserRecord};

fn token_pair(tokens: IssuedTokens) -> TokenPair {
    TokenPair {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }
}

async fn open_session(state: &SharedAppState, user: &UserRecord) -> AuthSession {
    let tokens = state.sessions.issue(user.id).await;
    AuthSession {
        user: state.user_profile(user).await,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
    (status = 200, description = "Logged in, returns the profile and a token pair", body = AuthSession),
    (status = 401, description = "Invalid email or password"),
    (status = 403, description = "Account is suspended"),
    )
)]
#[debug_handler]
pub async fn login_handler(
    State(state): State<SharedAppState>,
    Json(form): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .verify_credentials(&form.email, &form.password)
        .await
        .inspect_err(|e| warn!("Login failed for {}: {}", form.email, e))?;

    let session = open_session(&state, &user).await;
    info!("User {} logged in", user.email);

    Ok(Json(
        ApiResponse::ok(session).with_message("Login successful"),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
    (status = 201, description = "Patient account created and logged in", body = AuthSession),
    (status = 400, description = "Invalid input"),
    (status = 403, description = "Registration is disabled"),
    (status = 409, description = "Email already registered"),
    )
)]
#[debug_handler]
pub async fn register_handler(
    State(state): State<SharedAppState>,
    Json(form): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !state.settings.api.allow_registration {
        return Err(AppError::RegistrationDisabled);
    }

    // Self registration always yields a patient account
    let user = state
        .create_account(NewUser {
            email: form.email,
            password: form.password,
            first_name: form.first_name,
            last_name: form.last_name,
            role: RoleName::Patient.as_str().to_string(),
        })
        .await?;

    let session = open_session(&state, &user).await;
    info!("Patient {} registered", user.email);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(session).with_message("Registration successful")),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh-token",
    request_body = RefreshRequest,
    responses(
    (status = 200, description = "New token pair, the old refresh token is spent", body = TokenPair),
    (status = 401, description = "Refresh token invalid or expired"),
    )
)]
#[debug_handler]
pub async fn refresh_token_handler(
    State(state): State<SharedAppState>,
    Json(form): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user_id, tokens) = state.sessions.refresh(&form.refresh_token).await?;

    let active = state
        .users
        .get(&user_id)
        .await
        .map(|u| u.is_active)
        .unwrap_or(false);
    if !active {
        warn!("Refresh for missing or suspended user {}", user_id);
        state.sessions.revoke_user(&user_id).await;
        return Err(AppError::InvalidToken);
    }

    debug!("Refreshed session of user {}", user_id);
    Ok(Json(ApiResponse::ok(token_pair(tokens))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    request_body(content = Option<LogoutRequest>, description = "Refresh token to revoke as well"),
    responses(
    (status = 200, description = "Session ended"),
    (status = 401, description = "Access token is missing or invalid"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn logout_handler(
    State(state): State<SharedAppState>,
    Extension(user): Extension<CurrentUser>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let form: LogoutRequest = if body.is_empty() {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid logout request: {}", e)))?
    };

    state.sessions.revoke(&user.access_token).await;
    if let Some(refresh_token) = form.refresh_token {
        state.sessions.revoke(&refresh_token).await;
    }

    info!("User {} logged out", user.profile.email);
    Ok(Json(ApiResponse::<()>::ok(()).with_message("Logged out")))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
    (status = 200, description = "Profile of the current user", body = UserProfile),
    (status = 401, description = "Access token is missing or invalid"),
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn me_handler(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    Json(ApiResponse::ok(user.profile))
}
