use crate::auth::{AuthError, FileTokenStore};
use crate::utils::ui::Ui;
use careflow_core::http::{AuthenticatedClient, HttpClient, SessionTokens, TokenStore};
use std::sync::Arc;

/// ServerSettings contain information for connecting to the careflow server
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub server: String,
}

impl ServerSettings {
    pub fn api_url(&self) -> String {
        format!("{}/api/v1", self.server.trim_end_matches('/'))
    }
}

/// AppContext provides access to shared application resources
pub struct AppContext {
    ui: Arc<Ui>,
    server: ServerSettings,
    client: AuthenticatedClient,
}

impl AppContext {
    /// Context keeping its session in the user's token file.
    pub fn new(server: ServerSettings) -> anyhow::Result<Self> {
        let store = Arc::new(FileTokenStore::new(&server.server)?);
        Self::with_store(server, store)
    }

    pub fn with_store(server: ServerSettings, store: Arc<dyn TokenStore>) -> anyhow::Result<Self> {
        let client = AuthenticatedClient::new(HttpClient::new()?, server.api_url(), store);

        Ok(AppContext {
            ui: Arc::new(Ui::new()),
            server,
            client,
        })
    }

    pub fn ui(&self) -> &Arc<Ui> {
        &self.ui
    }

    pub fn server(&self) -> &ServerSettings {
        &self.server
    }

    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        self.client.store()
    }

    /// Tokens of the stored session, failing when there is none.
    pub async fn tokens(&self) -> Result<SessionTokens, AuthError> {
        self.store()
            .load()
            .await
            .ok_or_else(|| AuthError::NotLoggedIn(self.server.server.clone()))
    }
}
