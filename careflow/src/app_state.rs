use std::sync::Arc;

use anyhow::Context;
use careflow_types::{RoleInfo, UserProfile};
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::api::error::AppError;
use crate::services::authorization::AuthError;
use crate::services::users::{NewUser, UserRecord};
use crate::services::{AuthorizationService, SessionStore, UserDirectory};
use crate::settings::config::Settings;
use crate::stop_flag;

#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub stop_flag: stop_flag::StopFlag,
    pub auth_service: Arc<AuthorizationService>,
    pub users: Arc<UserDirectory>,
    pub sessions: Arc<SessionStore>,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn new() -> anyhow::Result<SharedAppState> {
        let settings = Settings::new()?;

        let stop_flag = stop_flag::StopFlag::new();
        stop_flag::register_signal_handler(&stop_flag);

        Self::from_settings(settings, stop_flag).await
    }

    /// Builds the state from already loaded settings: seeds or loads the
    /// role policy and creates the configured accounts.
    pub async fn from_settings(
        settings: Settings,
        stop_flag: stop_flag::StopFlag,
    ) -> anyhow::Result<SharedAppState> {
        let auth_service = AuthorizationService::new(&settings.rbac.policy_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to initialize authorization from {}",
                    settings.rbac.policy_path
                )
            })?;

        let users = UserDirectory::new(settings.api.password_hash_cost);
        let sessions =
            SessionStore::new(settings.api.access_token_ttl, settings.api.refresh_token_ttl);

        let state = Arc::new(AppState {
            settings,
            stop_flag,
            auth_service: Arc::new(auth_service),
            users: Arc::new(users),
            sessions: Arc::new(sessions),
        });

        state.bootstrap_users().await?;

        Ok(state)
    }

    async fn bootstrap_users(&self) -> anyhow::Result<()> {
        for user in &self.settings.users {
            if self.users.find_by_email(&user.email).await.is_some() {
                debug!("Bootstrap user {} already exists", user.email);
                continue;
            }

            self.create_account(NewUser {
                email: user.email.clone(),
                password: user.password.expose_secret().to_string(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                role: user.role.clone(),
            })
            .await
            .with_context(|| format!("Failed to create bootstrap user {}", user.email))?;
        }

        if !self.settings.users.is_empty() {
            info!("Bootstrapped {} users", self.settings.users.len());
        }
        Ok(())
    }

    /// Creates an account and assigns its role in the policy.
    pub async fn create_account(&self, new_user: NewUser) -> Result<UserRecord, AppError> {
        if !self.auth_service.role_exists(&new_user.role).await {
            return Err(AuthError::RoleNotFound(new_user.role).into());
        }

        let record = self.users.create(new_user).await?;
        self.auth_service.assign_role(&record.id, &record.role).await?;
        Ok(record)
    }

    /// Profile of a user with the effective permissions of their role.
    pub async fn user_profile(&self, user: &UserRecord) -> UserProfile {
        let role = self
            .auth_service
            .get_role(&user.role)
            .await
            .unwrap_or_else(|| RoleInfo {
                name: user.role.clone(),
                description: String::new(),
                permissions: Vec::new(),
            });

        UserProfile {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role,
            permissions: self.auth_service.effective_permissions(&user.id).await,
            disabled_permissions: self.auth_service.disabled_permissions(&user.id).await,
            is_active: user.is_active,
        }
    }
}
