mod authenticated;
mod client;
mod error;
mod retry;
mod token_store;

pub use authenticated::{AuthenticatedClient, REFRESH_PATH};
pub use client::{HttpClient, HttpClientBuilder};
pub use error::{HttpError, UserMessage, SESSION_EXPIRED_MESSAGE};
pub use retry::{is_retriable_error, with_retry, RetryConfig, RetryError};
pub use token_store::{MemoryTokenStore, SessionTokens, TokenStore};
