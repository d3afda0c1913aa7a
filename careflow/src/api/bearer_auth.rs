use axum::{
    extract::{Request, State},
    http,
    middleware::Next,
    response::Response,
};
use careflow_types::UserProfile;
use tracing::{debug, warn};

use crate::api::error::AppError;
use crate::app_state::SharedAppState;

/// The authenticated caller, inserted into the request extensions.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub profile: UserProfile,
    pub access_token: String,
}

/// Reads the bearer token from the `Authorization` header. The `Bearer `
/// prefix is optional.
pub fn bearer_token(req: &Request) -> Option<&str> {
    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())?
        .trim();

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .unwrap_or(header)
        .trim();

    (!token.is_empty()).then_some(token)
}

/// Resolves the session behind an access token to the user's profile.
pub async fn authenticate_user_from_token(
    state: &SharedAppState,
    token: &str,
) -> Result<CurrentUser, AppError> {
    let user_id = state.sessions.authenticate(token).await.ok_or_else(|| {
        warn!(
            "Bearer token authentication failed (token starts with: {}...)",
            token.chars().take(8).collect::<String>()
        );
        AppError::InvalidToken
    })?;

    let user = state.users.get(&user_id).await.ok_or_else(|| {
        warn!("Session of unknown user {}", user_id);
        AppError::InvalidToken
    })?;

    if !user.is_active {
        warn!("Suspended user {} presented a valid token", user.email);
        state.sessions.revoke_user(&user.id).await;
        return Err(AppError::InvalidToken);
    }

    debug!("Authenticated {}", user.email);
    Ok(CurrentUser {
        profile: state.user_profile(&user).await,
        access_token: token.to_string(),
    })
}

pub async fn auth(
    State(state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(&req) else {
        warn!("Missing Authorization header for {}", req.uri().path());
        return Err(AppError::Unauthorized);
    };

    let current_user = authenticate_user_from_token(&state, token).await?;
    req.extensions_mut().insert(current_user);

    Ok(next.run(req).await)
}
