use careflow_types::{Permission, PermissionCategory, PermissionInfo, RoleInfo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authorization::{CheckMode, NavigationItem};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct CategoryInfo {
    pub name: PermissionCategory,
    pub label: String,
}

impl From<PermissionCategory> for CategoryInfo {
    fn from(category: PermissionCategory) -> Self {
        Self {
            name: category,
            label: category.label().to_string(),
        }
    }
}

/// Response for the permission catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct PermissionsListResponse {
    pub permissions: Vec<PermissionInfo>,
    pub categories: Vec<CategoryInfo>,
}

/// Response for listing roles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct RolesListResponse {
    pub roles: Vec<RoleInfo>,
}

/// A user as listed in the admin screens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    #[serde(default)]
    pub disabled_permissions: Vec<Permission>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct UsersListResponse {
    pub users: Vec<UserSummary>,
}

/// Response for a permission check of the current user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct CheckAccessResponse {
    pub allowed: bool,
    pub mode: CheckMode,
    /// Requested permissions the user lacks
    pub missing: Vec<Permission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct NavigationResponse {
    pub items: Vec<NavigationItem>,
}
