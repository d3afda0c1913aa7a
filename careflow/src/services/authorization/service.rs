use anyhow::Result;
use careflow_types::{Permission, RoleInfo, RoleName};
use casbin::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::casbin::{user_subject, CasbinManager, DENY};
use super::error::AuthError;
use super::policy::{PolicyConfig, RoleConfig};

type ResolvedRoles = BTreeMap<String, (RoleConfig, Vec<Permission>)>;

/// Casbin-based authorization service
pub struct AuthorizationService {
    enforcer: Arc<RwLock<CachedEnforcer>>,
    roles: Arc<RwLock<ResolvedRoles>>,
    policy_path: Option<PathBuf>,
}

impl std::fmt::Debug for AuthorizationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationService")
            .field("policy_path", &self.policy_path)
            .finish_non_exhaustive()
    }
}

impl AuthorizationService {
    /// Loads (or seeds) the policy file and builds the enforcer from it.
    pub async fn new(policy_path: impl AsRef<Path>) -> Result<Self> {
        let policy_path = policy_path.as_ref().to_path_buf();
        let config = PolicyConfig::load_or_seed(&policy_path).await?;
        Self::build(config, Some(policy_path)).await
    }

    /// Service that keeps role changes in memory only.
    pub async fn from_config(config: PolicyConfig) -> Result<Self> {
        Self::build(config, None).await
    }

    async fn build(config: PolicyConfig, policy_path: Option<PathBuf>) -> Result<Self> {
        let roles = config.resolve()?;

        let mut enforcer = CasbinManager::create_enforcer().await?;
        CasbinManager::sync_roles(&mut enforcer, &roles).await?;

        info!("Authorization service initialized with {} roles", roles.len());

        Ok(Self {
            enforcer: Arc::new(RwLock::new(enforcer)),
            roles: Arc::new(RwLock::new(roles)),
            policy_path,
        })
    }

    /// Roles with their resolved permissions, built-in roles first.
    pub async fn list_roles(&self) -> Vec<RoleInfo> {
        let roles = self.roles.read().await;
        let mut list: Vec<RoleInfo> = roles
            .iter()
            .map(|(name, (config, permissions))| RoleInfo {
                name: name.clone(),
                description: config.description.clone(),
                permissions: permissions.clone(),
            })
            .collect();

        list.sort_by_key(|role| {
            let builtin = RoleName::all()
                .iter()
                .position(|r| r.as_str() == role.name)
                .unwrap_or(usize::MAX);
            (builtin, role.name.clone())
        });
        list
    }

    pub async fn get_role(&self, name: &str) -> Option<RoleInfo> {
        self.roles
            .read()
            .await
            .get(name)
            .map(|(config, permissions)| RoleInfo {
                name: name.to_string(),
                description: config.description.clone(),
                permissions: permissions.clone(),
            })
    }

    pub async fn role_exists(&self, name: &str) -> bool {
        self.roles.read().await.contains_key(name)
    }

    pub async fn role_count(&self) -> usize {
        self.roles.read().await.len()
    }

    /// Adds a role and persists the policy file.
    ///
    /// Unlike the policy file, unknown permission names are rejected here.
    pub async fn create_role(
        &self,
        name: &str,
        description: &str,
        permissions: &[String],
    ) -> Result<RoleInfo, AuthError> {
        let name = name.trim();
        if !is_valid_role_name(name) {
            return Err(AuthError::InvalidRoleName(name.to_string()));
        }

        if let Some(unknown) = permissions
            .iter()
            .find(|p| p.trim() != "*" && Permission::from_str(p).is_none())
        {
            return Err(AuthError::UnknownPermission(unknown.clone()));
        }

        let config = RoleConfig {
            description: description.trim().to_string(),
            permissions: permissions.iter().map(|p| p.trim().to_string()).collect(),
        };
        let resolved = config.resolve(name);
        if resolved.is_empty() {
            return Err(AuthError::NoValidPermissions(name.to_string()));
        }

        let mut roles = self.roles.write().await;
        if roles.contains_key(name) {
            return Err(AuthError::RoleExists(name.to_string()));
        }

        // The file is written first so a failed write leaves no live role
        if let Some(path) = &self.policy_path {
            let mut policy = policy_config(&roles);
            policy.roles.insert(name.to_string(), config.clone());
            policy
                .save(path)
                .await
                .map_err(|e| AuthError::Persistence(e.to_string()))?;
        }

        let mut enforcer = self.enforcer.write().await;
        CasbinManager::add_role_policies(&mut enforcer, name, &resolved).await?;
        roles.insert(name.to_string(), (config.clone(), resolved.clone()));
        info!("Created role {} with {} permissions", name, resolved.len());

        Ok(RoleInfo {
            name: name.to_string(),
            description: config.description,
            permissions: resolved,
        })
    }

    /// Puts the user into `role`, replacing any earlier assignment.
    pub async fn assign_role(&self, user_id: &Uuid, role: &str) -> Result<(), AuthError> {
        if !self.role_exists(role).await {
            return Err(AuthError::RoleNotFound(role.to_string()));
        }

        let mut enforcer = self.enforcer.write().await;
        CasbinManager::assign_role(&mut enforcer, user_id, role).await?;
        debug!("Assigned role {} to user {}", role, user_id);
        Ok(())
    }

    /// Replaces the permissions withheld from the user.
    pub async fn set_disabled_permissions(
        &self,
        user_id: &Uuid,
        permissions: &[Permission],
    ) -> Result<(), AuthError> {
        let mut enforcer = self.enforcer.write().await;
        CasbinManager::set_denied(&mut enforcer, user_id, permissions).await?;
        debug!(
            "User {} now has {} disabled permissions",
            user_id,
            permissions.len()
        );
        Ok(())
    }

    pub async fn disabled_permissions(&self, user_id: &Uuid) -> Vec<Permission> {
        let enforcer = self.enforcer.read().await;
        let rules = enforcer.get_filtered_policy(0, vec![user_subject(user_id)]);

        let mut disabled: Vec<Permission> = rules
            .iter()
            .filter(|rule| rule.get(2).map(String::as_str) == Some(DENY))
            .filter_map(|rule| rule.get(1).and_then(|name| Permission::from_str(name)))
            .collect();
        disabled.sort_by_key(|p| Permission::all().iter().position(|q| q == p));
        disabled
    }

    /// Check if a user holds a permission
    pub async fn check_permission(&self, user_id: &Uuid, permission: Permission) -> bool {
        let subject = user_subject(user_id);
        let enforcer = self.enforcer.read().await;

        match enforcer.enforce(vec![subject.as_str(), permission.as_str()]) {
            Ok(allowed) => {
                debug!(
                    "Permission {}: {} {}",
                    if allowed { "granted" } else { "denied" },
                    subject,
                    permission
                );
                allowed
            }
            Err(e) => {
                warn!("Failed to evaluate permission {} for {}: {}", permission, subject, e);
                false
            }
        }
    }

    /// Every permission the user holds after deny rules are applied, in
    /// catalog order.
    pub async fn effective_permissions(&self, user_id: &Uuid) -> Vec<Permission> {
        let subject = user_subject(user_id);
        let enforcer = self.enforcer.read().await;

        Permission::all()
            .iter()
            .copied()
            .filter(|permission| {
                enforcer
                    .enforce(vec![subject.as_str(), permission.as_str()])
                    .unwrap_or(false)
            })
            .collect()
    }
}

fn policy_config(roles: &ResolvedRoles) -> PolicyConfig {
    PolicyConfig {
        roles: roles
            .iter()
            .map(|(name, (config, _))| (name.clone(), config.clone()))
            .collect(),
    }
}

/// Lowercase letters, digits and underscores, starting with a letter.
fn is_valid_role_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name.len() <= 64
}
