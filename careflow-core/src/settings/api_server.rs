use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
#[readonly::make]
pub struct ApiServer {
    pub bind_address: String,
    /// Lifetime of access tokens in seconds
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl: u64,
    /// Lifetime of refresh tokens in seconds
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl: u64,
    /// Allow patients to register themselves
    #[serde(default = "default_allow_registration")]
    pub allow_registration: bool,
    #[serde(default = "default_password_hash_cost")]
    pub password_hash_cost: u32,
    /// Origins allowed to call the API from a browser. Empty allows any.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_access_token_ttl() -> u64 {
    15 * 60
}

fn default_refresh_token_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_allow_registration() -> bool {
    true
}

fn default_password_hash_cost() -> u32 {
    12
}

impl Default for ApiServer {
    fn default() -> Self {
        ApiServer {
            bind_address: "0.0.0.0:21342".to_string(),
            access_token_ttl: default_access_token_ttl(),
            refresh_token_ttl: default_refresh_token_ttl(),
            allow_registration: default_allow_registration(),
            password_hash_cost: default_password_hash_cost(),
            cors_origins: Vec::new(),
        }
    }
}
