use anyhow::{Context, Result};
use careflow_types::Permission;
use casbin::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

use super::policy::RoleConfig;

/// Grants come from roles, a deny rule on the user overrides them.
pub const MODEL: &str = r#"
[request_definition]
r = sub, obj

[policy_definition]
p = sub, obj, eft

[role_definition]
g = _, _

[policy_effect]
e = some(where (p.eft == allow)) && !some(where (p.eft == deny))

[matchers]
m = g(r.sub, p.sub) && r.obj == p.obj
"#;

pub const ALLOW: &str = "allow";
pub const DENY: &str = "deny";

pub fn role_subject(role: &str) -> String {
    format!("role:{}", role)
}

pub fn user_subject(user_id: &Uuid) -> String {
    format!("user:{}", user_id)
}

/// Casbin-specific operations and policy management
pub struct CasbinManager;

impl CasbinManager {
    pub async fn create_enforcer() -> Result<CachedEnforcer> {
        let model = DefaultModel::from_str(MODEL)
            .await
            .context("Failed to load Casbin model")?;
        let adapter = MemoryAdapter::default();

        CachedEnforcer::new(model, adapter)
            .await
            .context("Failed to create Casbin enforcer")
    }

    /// Loads the grants of every resolved role into the enforcer.
    pub async fn sync_roles(
        enforcer: &mut CachedEnforcer,
        roles: &BTreeMap<String, (RoleConfig, Vec<Permission>)>,
    ) -> Result<()> {
        info!("Starting Casbin policy synchronization");

        for (role, (_, permissions)) in roles {
            Self::add_role_policies(enforcer, role, permissions).await?;
        }

        info!("Casbin policy synchronization completed");
        Ok(())
    }

    pub async fn add_role_policies(
        enforcer: &mut CachedEnforcer,
        role: &str,
        permissions: &[Permission],
    ) -> casbin::Result<()> {
        let subject = role_subject(role);
        let rules: Vec<Vec<String>> = permissions
            .iter()
            .map(|p| vec![subject.clone(), p.as_str().to_string(), ALLOW.to_string()])
            .collect();

        debug!("Adding {} policies for {}", rules.len(), subject);
        if !rules.is_empty() {
            enforcer.add_policies(rules).await?;
        }
        Ok(())
    }

    /// Replaces the role assignment of a user.
    pub async fn assign_role(
        enforcer: &mut CachedEnforcer,
        user_id: &Uuid,
        role: &str,
    ) -> casbin::Result<()> {
        let subject = user_subject(user_id);
        enforcer
            .remove_filtered_named_grouping_policy("g", 0, vec![subject.clone()])
            .await?;
        enforcer
            .add_named_grouping_policy("g", vec![subject, role_subject(role)])
            .await?;
        Ok(())
    }

    /// Replaces the deny rules of a user.
    pub async fn set_denied(
        enforcer: &mut CachedEnforcer,
        user_id: &Uuid,
        permissions: &[Permission],
    ) -> casbin::Result<()> {
        let subject = user_subject(user_id);
        enforcer
            .remove_filtered_policy(0, vec![subject.clone()])
            .await?;

        let rules: Vec<Vec<String>> = permissions
            .iter()
            .map(|p| vec![subject.clone(), p.as_str().to_string(), DENY.to_string()])
            .collect();
        if !rules.is_empty() {
            enforcer.add_policies(rules).await?;
        }
        Ok(())
    }
}
