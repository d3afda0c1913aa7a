pub mod storage;

pub use storage::FileTokenStore;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration directory not found, is $HOME set?")]
    ConfigDirNotFound,
    #[error("Not logged in to {0}. Run `careflowctl auth:login` first.")]
    NotLoggedIn(String),
}
