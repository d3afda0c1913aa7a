use careflow_types::{Permission, RoleName, UserProfile};
use serde::{Deserialize, Serialize};

use super::checks::{has_all_permissions, has_any_permission, has_permission};

pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

fn default_redirect_to() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

/// What a guarded page or endpoint demands from the current user.
///
/// An empty requirement only asks for an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AccessRequirement {
    /// Single permission that must be present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
    /// Permission list, combined with OR unless `require_all` is set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub require_all: bool,
    /// Exact role the user must have
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleName>,
    /// The user must have one of these roles
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleName>,
    /// Where unauthenticated users are sent
    #[serde(default = "default_redirect_to")]
    pub redirect_to: String,
}

impl Default for AccessRequirement {
    fn default() -> Self {
        Self {
            permission: None,
            permissions: Vec::new(),
            require_all: false,
            role: None,
            roles: Vec::new(),
            redirect_to: default_redirect_to(),
        }
    }
}

/// Outcome of evaluating an [`AccessRequirement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    Granted,
    RedirectToLogin { to: String },
    Denied { reason: String },
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }
}

impl AccessRequirement {
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn permission(permission: Permission) -> Self {
        Self {
            permission: Some(permission),
            ..Self::default()
        }
    }

    pub fn any_of(permissions: &[Permission]) -> Self {
        Self {
            permissions: permissions.to_vec(),
            ..Self::default()
        }
    }

    pub fn all_of(permissions: &[Permission]) -> Self {
        Self {
            permissions: permissions.to_vec(),
            require_all: true,
            ..Self::default()
        }
    }

    pub fn role(role: RoleName) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn roles(roles: &[RoleName]) -> Self {
        Self {
            roles: roles.to_vec(),
            ..Self::default()
        }
    }

    pub fn with_redirect(mut self, redirect_to: impl Into<String>) -> Self {
        self.redirect_to = redirect_to.into();
        self
    }

    /// Permission part of the requirement only, for hiding single UI
    /// elements where authentication and role are already settled.
    pub fn permits(&self, permissions: &[Permission]) -> bool {
        if let Some(required) = self.permission {
            if !has_permission(permissions, required) {
                return false;
            }
        }

        if self.permissions.is_empty() {
            return true;
        }

        if self.require_all {
            has_all_permissions(permissions, &self.permissions)
        } else {
            has_any_permission(permissions, &self.permissions)
        }
    }

    /// Evaluates the requirement for `user`, `None` meaning not logged in.
    ///
    /// Checks run in a fixed order: authentication, exact role, role list,
    /// single permission, permission list. The first failing check decides.
    pub fn evaluate(&self, user: Option<&UserProfile>) -> AccessDecision {
        let Some(user) = user else {
            return AccessDecision::RedirectToLogin {
                to: self.redirect_to.clone(),
            };
        };

        if let Some(role) = self.role {
            if user.role.name != role.as_str() {
                return AccessDecision::Denied {
                    reason: format!("requires role {}", role),
                };
            }
        }

        if !self.roles.is_empty() && !self.roles.iter().any(|r| user.role.name == r.as_str()) {
            let roles: Vec<_> = self.roles.iter().map(|r| r.as_str()).collect();
            return AccessDecision::Denied {
                reason: format!("requires one of the roles {}", roles.join(", ")),
            };
        }

        if let Some(permission) = self.permission {
            if !has_permission(&user.permissions, permission) {
                return AccessDecision::Denied {
                    reason: format!("missing permission {}", permission),
                };
            }
        }

        if !self.permissions.is_empty() {
            let names: Vec<_> = self.permissions.iter().map(|p| p.as_str()).collect();
            if self.require_all {
                if !has_all_permissions(&user.permissions, &self.permissions) {
                    return AccessDecision::Denied {
                        reason: format!("requires all of {}", names.join(", ")),
                    };
                }
            } else if !has_any_permission(&user.permissions, &self.permissions) {
                return AccessDecision::Denied {
                    reason: format!("requires any of {}", names.join(", ")),
                };
            }
        }

        AccessDecision::Granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careflow_types::RoleInfo;
    use uuid::Uuid;

    fn user(role: RoleName) -> UserProfile {
        let info = RoleInfo::builtin(role);
        UserProfile {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", role),
            first_name: role.label().to_string(),
            last_name: "Test".to_string(),
            permissions: info.permissions.clone(),
            role: info,
            disabled_permissions: vec![],
            is_active: true,
        }
    }

    #[test]
    fn test_unauthenticated_is_redirected() {
        let decision = AccessRequirement::permission(Permission::ViewAllPatients).evaluate(None);
        assert_eq!(
            decision,
            AccessDecision::RedirectToLogin {
                to: "/auth/login".to_string()
            }
        );

        let decision = AccessRequirement::authenticated()
            .with_redirect("/login")
            .evaluate(None);
        assert_eq!(
            decision,
            AccessDecision::RedirectToLogin {
                to: "/login".to_string()
            }
        );
    }

    #[test]
    fn test_authenticated_only() {
        let patient = user(RoleName::Patient);
        assert!(AccessRequirement::authenticated()
            .evaluate(Some(&patient))
            .is_granted());
    }

    #[test]
    fn test_role_checks_run_before_permissions() {
        let nurse = user(RoleName::Nurse);
        let requirement = AccessRequirement {
            role: Some(RoleName::Doctor),
            permission: Some(Permission::CreateConsultations),
            ..AccessRequirement::default()
        };
        assert_eq!(
            requirement.evaluate(Some(&nurse)),
            AccessDecision::Denied {
                reason: "requires role doctor".to_string()
            }
        );

        let requirement = AccessRequirement::roles(&[RoleName::Doctor, RoleName::Nurse]);
        assert!(requirement.evaluate(Some(&nurse)).is_granted());
        assert!(!requirement
            .evaluate(Some(&user(RoleName::Secretary)))
            .is_granted());
    }

    #[test]
    fn test_permission_lists() {
        let doctor = user(RoleName::Doctor);
        let lab = user(RoleName::LabTechnician);

        let any = AccessRequirement::any_of(&[
            Permission::ViewAllDocuments,
            Permission::ViewOwnDocuments,
        ]);
        assert!(any.evaluate(Some(&doctor)).is_granted());
        assert!(any.evaluate(Some(&user(RoleName::Patient))).is_granted());
        assert!(!any.evaluate(Some(&user(RoleName::Pharmacist))).is_granted());

        let all = AccessRequirement::all_of(&[Permission::ViewLabOrders, Permission::EditLabOrders]);
        assert!(all.evaluate(Some(&doctor)).is_granted());
        assert_eq!(
            all.evaluate(Some(&lab)),
            AccessDecision::Denied {
                reason: "requires all of view_lab_orders, edit_lab_orders".to_string()
            }
        );
    }

    #[test]
    fn test_disabled_permission_is_denied() {
        let mut doctor = user(RoleName::Doctor);
        doctor.permissions.retain(|p| *p != Permission::SignPrescriptions);
        doctor.disabled_permissions = vec![Permission::SignPrescriptions];

        let decision = AccessRequirement::permission(Permission::SignPrescriptions).evaluate(Some(&doctor));
        assert_eq!(
            decision,
            AccessDecision::Denied {
                reason: "missing permission sign_prescriptions".to_string()
            }
        );
    }

    #[test]
    fn test_permits() {
        let perms = [Permission::CreateUsers];
        assert!(AccessRequirement::default().permits(&perms));
        assert!(AccessRequirement::permission(Permission::CreateUsers).permits(&perms));
        assert!(!AccessRequirement::all_of(&[Permission::CreateUsers, Permission::ViewAllUsers])
            .permits(&perms));
    }

    #[test]
    fn test_requirement_deserializes_with_defaults() {
        let requirement: AccessRequirement =
            serde_json::from_str(r#"{"permissions": ["view_lab_orders"], "requireAll": true}"#)
                .unwrap();
        assert_eq!(requirement.redirect_to, "/auth/login");
        assert!(requirement.require_all);
        assert_eq!(requirement.permissions, vec![Permission::ViewLabOrders]);
    }
}
