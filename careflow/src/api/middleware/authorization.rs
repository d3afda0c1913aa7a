use axum::{extract::Request, middleware::Next, response::Response};
use careflow_core::authorization::{AccessDecision, AccessRequirement};
use careflow_types::Permission;
use std::{future::Future, pin::Pin};
use tracing::{debug, warn};

use crate::api::{bearer_auth::CurrentUser, error::AppError};

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// Middleware factory guarding a route with an [`AccessRequirement`].
///
/// Must run inside the bearer auth middleware, which provides the
/// [`CurrentUser`].
pub fn require_access(
    requirement: AccessRequirement,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    move |req: Request, next: Next| {
        let requirement = requirement.clone();
        Box::pin(async move {
            let user = req.extensions().get::<CurrentUser>();

            match requirement.evaluate(user.map(|u| &u.profile)) {
                AccessDecision::Granted => {
                    debug!("Access granted for {}", req.uri().path());
                    Ok(next.run(req).await)
                }
                AccessDecision::RedirectToLogin { .. } => {
                    warn!("Unauthenticated request reached {}", req.uri().path());
                    Err(AppError::Unauthorized)
                }
                AccessDecision::Denied { reason } => {
                    warn!(
                        "Access denied: user {} on {}: {}",
                        user.map(|u| u.profile.email.as_str()).unwrap_or_default(),
                        req.uri().path(),
                        reason
                    );
                    Err(AppError::Forbidden(format!(
                        "You do not have permission to perform this action ({})",
                        reason
                    )))
                }
            }
        })
    }
}

pub fn require_permission(
    permission: Permission,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    require_access(AccessRequirement::permission(permission))
}
