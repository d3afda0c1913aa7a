use async_trait::async_trait;
use careflow_core::http::{SessionTokens, TokenStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use super::AuthError;

const TOKEN_FILE: &str = "tokens.json";

#[derive(serde::Serialize, serde::Deserialize, Default, Debug)]
struct TokenFile {
    tokens: HashMap<String, SessionTokens>,
}

/// Keeps the session tokens of every server the user logged in to in
/// `~/.config/careflowctl/tokens.json`, keyed by the normalized server url.
pub struct FileTokenStore {
    config_dir: PathBuf,
    server_key: String,
}

impl FileTokenStore {
    pub fn new(server_url: &str) -> Result<Self, AuthError> {
        Ok(Self::in_dir(get_config_dir()?, server_url))
    }

    pub fn in_dir(config_dir: impl Into<PathBuf>, server_url: &str) -> Self {
        Self {
            config_dir: config_dir.into(),
            server_key: normalize_server_url(server_url),
        }
    }

    pub fn token_file(&self) -> PathBuf {
        self.config_dir.join(TOKEN_FILE)
    }

    async fn read_file(&self) -> Result<TokenFile, AuthError> {
        let token_file = self.token_file();
        if !fs::try_exists(&token_file).await? {
            debug!("Token file {:?} does not exist", token_file);
            return Ok(TokenFile::default());
        }

        let json = fs::read_to_string(&token_file).await?;
        Ok(serde_json::from_str(&json)?)
    }

    async fn write_file(&self, file: &TokenFile) -> Result<(), AuthError> {
        fs::create_dir_all(&self.config_dir).await?;

        let token_file = self.token_file();
        fs::write(&token_file, serde_json::to_string_pretty(file)?).await?;
        restrict_permissions(&token_file).await?;
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<(), AuthError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<(), AuthError> {
    Ok(())
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Option<SessionTokens> {
        match self.read_file().await {
            Ok(mut file) => {
                let tokens = file.tokens.remove(&self.server_key);
                debug!(
                    "Stored session for {}: {}",
                    self.server_key,
                    if tokens.is_some() { "found" } else { "none" }
                );
                tokens
            }
            Err(e) => {
                warn!("Could not read {:?}: {}", self.token_file(), e);
                None
            }
        }
    }

    async fn save(&self, tokens: SessionTokens) -> anyhow::Result<()> {
        // A corrupt file is replaced instead of blocking every login
        let mut file = self.read_file().await.unwrap_or_default();
        file.tokens.insert(self.server_key.clone(), tokens);
        self.write_file(&file).await?;
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        let mut file = self.read_file().await.unwrap_or_default();
        if file.tokens.remove(&self.server_key).is_some() {
            self.write_file(&file).await?;
            debug!("Removed session for {}", self.server_key);
        }
        Ok(())
    }
}

fn get_config_dir() -> Result<PathBuf, AuthError> {
    let home_dir = std::env::var("HOME").map_err(|_| AuthError::ConfigDirNotFound)?;
    Ok(PathBuf::from(home_dir).join(".config").join("careflowctl"))
}

/// `HTTP://Localhost:21342/` and `http://localhost:21342` share one entry.
pub fn normalize_server_url(server_url: &str) -> String {
    match url::Url::parse(server_url.trim()) {
        Ok(url) => url.as_str().trim_end_matches('/').to_string(),
        Err(_) => server_url.trim().trim_end_matches('/').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tokens(access: &str) -> SessionTokens {
        SessionTokens {
            access_token: access.to_string(),
            refresh_token: format!("{}-refresh", access),
        }
    }

    #[test]
    fn test_normalize_server_url() {
        assert_eq!(
            normalize_server_url("HTTP://Localhost:21342/"),
            "http://localhost:21342"
        );
        assert_eq!(
            normalize_server_url("https://ehr.example.com/"),
            "https://ehr.example.com"
        );
        assert_eq!(normalize_server_url("not a url/"), "not a url");
    }

    #[tokio::test]
    async fn test_sessions_are_kept_per_server() {
        let dir = TempDir::new().unwrap();
        let local = FileTokenStore::in_dir(dir.path(), "http://localhost:21342");
        let remote = FileTokenStore::in_dir(dir.path(), "https://ehr.example.com");

        assert_eq!(local.load().await, None);

        local.save(tokens("local")).await.unwrap();
        remote.save(tokens("remote")).await.unwrap();

        let same_server = FileTokenStore::in_dir(dir.path(), "http://LOCALHOST:21342/");
        assert_eq!(same_server.load().await, Some(tokens("local")));

        local.clear().await.unwrap();
        assert_eq!(local.load().await, None);
        assert_eq!(remote.load().await, Some(tokens("remote")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::in_dir(dir.path().join("nested"), "http://localhost:21342");
        store.save(tokens("secret")).await.unwrap();

        let mode = std::fs::metadata(store.token_file())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_logged_out() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "{ not json").unwrap();

        let store = FileTokenStore::in_dir(dir.path(), "http://localhost:21342");
        assert_eq!(store.load().await, None);

        store.save(tokens("fresh")).await.unwrap();
        assert_eq!(store.load().await, Some(tokens("fresh")));
    }
}
