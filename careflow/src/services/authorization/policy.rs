use anyhow::{Context, Result};
use careflow_types::{Permission, RoleName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use super::error::AuthError;

pub const WILDCARD: &str = "*";

/// Role to permission mapping as stored in the policy file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub roles: BTreeMap<String, RoleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub description: String,
    /// Permission names, `*` grants the whole catalog
    pub permissions: Vec<String>,
}

impl RoleConfig {
    /// Resolves the configured names against the catalog.
    ///
    /// Unknown names are dropped with a warning, duplicates are removed and
    /// the first occurrence decides the order.
    pub fn resolve(&self, role: &str) -> Vec<Permission> {
        let mut resolved: Vec<Permission> = Vec::new();

        for name in &self.permissions {
            if name.trim() == WILDCARD {
                for permission in Permission::all() {
                    if !resolved.contains(permission) {
                        resolved.push(*permission);
                    }
                }
                continue;
            }

            match Permission::from_str(name) {
                Some(permission) if !resolved.contains(&permission) => resolved.push(permission),
                Some(_) => {}
                None => warn!("Ignoring unknown permission '{}' of role '{}'", name, role),
            }
        }

        resolved
    }
}

impl PolicyConfig {
    /// The built-in roles with their default permissions.
    pub fn seed() -> Self {
        let roles = RoleName::all()
            .iter()
            .map(|role| {
                let permissions = if *role == RoleName::Admin {
                    vec![WILDCARD.to_string()]
                } else {
                    role.default_permissions()
                        .iter()
                        .map(|p| p.as_str().to_string())
                        .collect()
                };
                (
                    role.as_str().to_string(),
                    RoleConfig {
                        description: role.description().to_string(),
                        permissions,
                    },
                )
            })
            .collect();

        Self { roles }
    }

    /// Resolves every role, failing on the first role left without a
    /// single valid permission.
    pub fn resolve(&self) -> Result<BTreeMap<String, (RoleConfig, Vec<Permission>)>, AuthError> {
        let mut resolved = BTreeMap::new();
        for (name, config) in &self.roles {
            let permissions = config.resolve(name);
            if permissions.is_empty() {
                return Err(AuthError::NoValidPermissions(name.clone()));
            }
            resolved.insert(name.clone(), (config.clone(), permissions));
        }
        Ok(resolved)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read policy file {}", path.display()))?;

        serde_norway::from_str(&content)
            .with_context(|| format!("Failed to parse policy file {}", path.display()))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let yaml = serde_norway::to_string(self)?;
        tokio::fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write policy file {}", path.display()))?;
        Ok(())
    }

    /// Loads the policy file, writing the seed first when it does not exist.
    ///
    /// Seeding happens once: an existing file is never touched, even if
    /// it lacks some of the built-in roles.
    pub async fn load_or_seed(path: &Path) -> Result<Self> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            info!("Roles and permissions already seeded, skipping...");
            return Self::load(path).await;
        }

        let seed = Self::seed();
        seed.resolve()?;
        seed.save(path).await?;

        info!(
            "Seeded {} permissions and {} roles successfully",
            Permission::all().len(),
            seed.roles.len()
        );

        Ok(seed)
    }
}
