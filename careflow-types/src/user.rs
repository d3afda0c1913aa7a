use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::permission::Permission;
use crate::role::RoleInfo;

/// The authenticated user as seen by clients. `permissions` is the
/// effective set: the role's grants minus `disabled_permissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: RoleInfo,
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub disabled_permissions: Vec<Permission>,
    pub is_active: bool,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
