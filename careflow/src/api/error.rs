use axum::http::StatusCode;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use careflow_types::ApiResponse;
use thiserror::Error;
use uuid::Uuid;

use crate::services::authorization::AuthError;
use crate::services::sessions::SessionError;
use crate::services::users::UserError;

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("Not found")]
    NotFound,

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("{0}")]
    BadRequest(String),

    #[error("Registration is disabled")]
    RegistrationDisabled,

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::RegistrationDisabled => StatusCode::FORBIDDEN,
            AppError::NotFound | AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(e) => match e {
                AuthError::RoleNotFound(_)
                | AuthError::InvalidRoleName(_)
                | AuthError::UnknownPermission(_)
                | AuthError::NoValidPermissions(_) => StatusCode::BAD_REQUEST,
                AuthError::RoleExists(_) => StatusCode::CONFLICT,
                AuthError::Policy(_) | AuthError::Persistence(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::User(e) => match e {
                UserError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                UserError::AccountSuspended => StatusCode::FORBIDDEN,
                UserError::NotFound(_) => StatusCode::NOT_FOUND,
                UserError::EmailTaken(_) => StatusCode::CONFLICT,
                UserError::InvalidEmail(_) | UserError::WeakPassword | UserError::MissingName => {
                    StatusCode::BAD_REQUEST
                }
                UserError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Session(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn get_error_msg(&self) -> (StatusCode, String) {
        let status = self.status_code();
        let message = if status.is_server_error() {
            // Details stay in the log
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, message)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        if let Some(app_error) = e.downcast_ref::<AppError>() {
            return app_error.clone();
        }
        AppError::InternalServerError(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.get_error_msg();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
