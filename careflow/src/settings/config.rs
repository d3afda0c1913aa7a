use careflow_core::settings::api_server::ApiServer;
use careflow_core::settings::scheduler_interval::SchedulerInterval;
use config::{Config, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use std::env;

pub const DEFAULT_POLICY_PATH: &str = "config/rbac/policy.yaml";

#[derive(Debug, Deserialize, Clone)]
#[readonly::make]
pub struct RbacSettings {
    /// Role to permission mapping, written from the built-in seed when missing
    pub policy_path: String,
}

impl Default for RbacSettings {
    fn default() -> Self {
        Self {
            policy_path: DEFAULT_POLICY_PATH.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[readonly::make]
pub struct Scheduler {
    /// How often sessions with an expired refresh token are dropped
    pub session_cleanup: SchedulerInterval,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            session_cleanup: SchedulerInterval::Minutes(5),
        }
    }
}

/// Account created on startup when no account with the same email exists.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapUser {
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
pub struct Settings {
    #[serde(default)]
    pub debug: bool,
    pub api: ApiServer,
    #[serde(default)]
    pub rbac: RbacSettings,
    #[serde(default)]
    pub scheduler: Scheduler,
    #[serde(default)]
    pub users: Vec<BootstrapUser>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            debug: false,
            api: ApiServer::default(),
            rbac: RbacSettings::default(),
            scheduler: Scheduler::default(),
            users: Vec::new(),
        }
    }
}

impl Settings {
    pub fn get_environment() -> Environment {
        Environment::default()
            .prefix("CAREFLOW")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("CAREFLOW_RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("api.bind_address", "0.0.0.0:21342")?
            .set_default("rbac.policy_path", DEFAULT_POLICY_PATH)?
            .set_default("scheduler.session_cleanup", "5m")?
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Self::get_environment());

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.access_token_ttl == 0 || self.api.refresh_token_ttl == 0 {
            return Err(ConfigError::Message(
                "api.access_token_ttl and api.refresh_token_ttl must be positive".into(),
            ));
        }
        if !(4..=31).contains(&self.api.password_hash_cost) {
            return Err(ConfigError::Message(format!(
                "api.password_hash_cost must be between 4 and 31, got {}",
                self.api.password_hash_cost
            )));
        }
        Ok(())
    }
}
