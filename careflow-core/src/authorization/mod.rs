//! Client-side evaluation model for role based access control: permission
//! set checks, page guards and sidebar filtering.
//!
//! The server is the authority for a user's effective permissions. The
//! functions here only interpret the list it hands out.

mod access;
mod checks;
mod navigation;
mod routes;

pub use access::{AccessDecision, AccessRequirement, DEFAULT_LOGIN_PATH};
pub use checks::{
    can_access_resource, check_permissions, filter_by_permission, has_all_permissions,
    has_any_permission, has_any_role, has_permission, has_role, permission_categories,
    permission_names, permissions_by_category, CheckMode, ResourceRequirement,
};
pub use navigation::{default_navigation, visible_navigation, NavigationItem};
pub use routes::{RouteAccess, RouteDecision, RouteEntry, RouteTable, FALLBACK_PATH};
