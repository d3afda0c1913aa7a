use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Role already exists: {0}")]
    RoleExists(String),

    #[error("Invalid role name: {0}")]
    InvalidRoleName(String),

    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("No valid permissions found for role: {0}")]
    NoValidPermissions(String),

    #[error("Policy update failed: {0}")]
    Policy(String),

    #[error("Failed to persist policy: {0}")]
    Persistence(String),
}

impl From<::casbin::Error> for AuthError {
    fn from(e: ::casbin::Error) -> Self {
        AuthError::Policy(e.to_string())
    }
}
