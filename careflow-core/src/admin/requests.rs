use serde::{Deserialize, Serialize};

use crate::authorization::CheckMode;

/// Request to create a new role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::Parser))]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct CreateRoleRequest {
    /// Name of the role
    pub name: String,
    /// Description of the role
    pub description: String,
    /// Permissions for the role (comma-separated). Use '*' for every permission
    #[cfg_attr(feature = "clap", arg(long, value_delimiter = ','))]
    pub permissions: Vec<String>,
}

/// Request to create a staff account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::Parser))]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Email address, used as login
    pub email: String,
    /// Role of the new user (e.g. doctor, nurse, lab_technician)
    #[cfg_attr(feature = "clap", arg(long))]
    pub role: String,
    #[cfg_attr(feature = "clap", arg(long))]
    pub first_name: String,
    #[cfg_attr(feature = "clap", arg(long))]
    pub last_name: String,
    /// Initial password
    #[cfg_attr(
        feature = "clap",
        arg(long, env = "CAREFLOW_NEW_USER_PASSWORD", hide_env_values = true)
    )]
    pub password: String,
}

/// Request to move a user to another role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct UpdateUserRoleRequest {
    pub role: String,
}

/// Request to suspend or reactivate an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
}

/// Replaces the set of permissions withheld from a user regardless of role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct DisablePermissionsRequest {
    pub permissions: Vec<String>,
}

/// Request to test the current user's permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::Parser))]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct CheckAccessRequest {
    /// Permissions to check (comma-separated)
    #[cfg_attr(feature = "clap", arg(value_delimiter = ',', required = true))]
    pub permissions: Vec<String>,
    /// Whether any or all of the permissions are needed
    #[cfg_attr(feature = "clap", arg(long, value_enum, default_value_t = CheckMode::Any))]
    #[serde(default)]
    pub mode: CheckMode,
}
