use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Access and refresh token of a logged in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Where an [`AuthenticatedClient`](super::AuthenticatedClient) keeps the
/// tokens of the current session.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Option<SessionTokens>;
    async fn save(&self, tokens: SessionTokens) -> anyhow::Result<()>;
    async fn clear(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<SessionTokens>>,
}

impl MemoryTokenStore {
    pub fn new(tokens: Option<SessionTokens>) -> Self {
        Self {
            tokens: RwLock::new(tokens),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Option<SessionTokens> {
        self.tokens.read().await.clone()
    }

    async fn save(&self, tokens: SessionTokens) -> anyhow::Result<()> {
        *self.tokens.write().await = Some(tokens);
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.tokens.write().await = None;
        Ok(())
    }
}
