//! Membership checks over a user's effective permissions.
//!
//! All functions take the permission list as delivered by the server
//! (`UserProfile::permissions`). The list is small, so plain slice scans
//! are used instead of building sets.

use careflow_types::{Permission, PermissionCategory, RoleName, UserProfile};
use serde::{Deserialize, Serialize};

/// How a list of required permissions is combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// At least one permission must be present
    #[default]
    Any,
    /// Every permission must be present
    All,
}

pub fn has_permission(permissions: &[Permission], required: Permission) -> bool {
    permissions.contains(&required)
}

/// OR check. An empty `required` list never matches.
pub fn has_any_permission(permissions: &[Permission], required: &[Permission]) -> bool {
    required.iter().any(|p| permissions.contains(p))
}

/// AND check. An empty `required` list always matches.
pub fn has_all_permissions(permissions: &[Permission], required: &[Permission]) -> bool {
    required.iter().all(|p| permissions.contains(p))
}

pub fn check_permissions(permissions: &[Permission], required: &[Permission], mode: CheckMode) -> bool {
    match mode {
        CheckMode::Any => has_any_permission(permissions, required),
        CheckMode::All => has_all_permissions(permissions, required),
    }
}

pub fn has_role(user: Option<&UserProfile>, role: RoleName) -> bool {
    user.is_some_and(|u| u.role.name == role.as_str())
}

pub fn has_any_role(user: Option<&UserProfile>, roles: &[RoleName]) -> bool {
    roles.iter().any(|role| has_role(user, *role))
}

pub fn permissions_by_category(
    permissions: &[Permission],
    category: PermissionCategory,
) -> Vec<Permission> {
    permissions
        .iter()
        .copied()
        .filter(|p| p.category() == category)
        .collect()
}

/// Unique categories of `permissions`, in the order they first appear.
pub fn permission_categories(permissions: &[Permission]) -> Vec<PermissionCategory> {
    let mut categories: Vec<PermissionCategory> = Vec::new();
    for permission in permissions {
        let category = permission.category();
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    categories
}

/// Keeps the items the user may see. Items without a required permission
/// are always kept.
pub fn filter_by_permission<'a, T, F>(
    items: &'a [T],
    permissions: &[Permission],
    required_of: F,
) -> Vec<&'a T>
where
    F: Fn(&T) -> Option<Permission>,
{
    items
        .iter()
        .filter(|item| match required_of(*item) {
            Some(required) => has_permission(permissions, required),
            None => true,
        })
        .collect()
}

/// Combined requirement on a resource. Empty lists impose no requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirement {
    #[serde(default)]
    pub require_all: Vec<Permission>,
    #[serde(default)]
    pub require_any: Vec<Permission>,
}

pub fn can_access_resource(permissions: &[Permission], requirement: &ResourceRequirement) -> bool {
    if !requirement.require_all.is_empty()
        && !has_all_permissions(permissions, &requirement.require_all)
    {
        return false;
    }

    if !requirement.require_any.is_empty()
        && !has_any_permission(permissions, &requirement.require_any)
    {
        return false;
    }

    true
}

pub fn permission_names(permissions: &[Permission]) -> Vec<&'static str> {
    permissions.iter().map(|p| p.as_str()).collect()
}
