use std::sync::Arc;

use careflow_types::{ApiResponse, RefreshRequest, TokenPair};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::client::HttpClient;
use super::error::HttpError;
use super::retry::RetryError;
use super::token_store::{SessionTokens, TokenStore};

pub const REFRESH_PATH: &str = "auth/refresh-token";

/// HTTP client for the careflow API that authenticates with the stored
/// access token and transparently refreshes it once when the server answers
/// with 401.
///
/// Concurrent requests failing with 401 share a single refresh call. When
/// the refresh itself fails the token store is cleared and the request fails
/// with [`HttpError::SessionExpired`].
pub struct AuthenticatedClient {
    http: HttpClient,
    base_url: String,
    store: Arc<dyn TokenStore>,
    refresh_lock: Mutex<()>,
}

impl AuthenticatedClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Call an endpoint that needs no authentication.
    pub async fn public_request<B, R>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<R, RetryError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.http
            .request_json(method, &self.url(path), body, None)
            .await
    }

    pub async fn request<B, R>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<R, RetryError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        let access_token = self.store.load().await.map(|t| t.access_token);

        match self
            .http
            .request_json(method.clone(), &url, body, access_token.as_deref())
            .await
        {
            Err(RetryError::NonRetriable(err)) if err.is_unauthorized() => {
                debug!("{} {} was rejected with 401, refreshing session", method, url);
                let fresh = self
                    .refresh_session(access_token.as_deref())
                    .await
                    .map_err(RetryError::NonRetriable)?;

                // Replayed exactly once, a second 401 goes back to the caller
                self.http
                    .request_json(method, &url, body, Some(&fresh))
                    .await
            }
            other => other,
        }
    }

    pub async fn get<R>(&self, path: &str) -> Result<R, RetryError>
    where
        R: DeserializeOwned,
    {
        self.request::<(), R>(Method::GET, path, None).await
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, RetryError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, RetryError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, RetryError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<R>(&self, path: &str) -> Result<R, RetryError>
    where
        R: DeserializeOwned,
    {
        self.request::<(), R>(Method::DELETE, path, None).await
    }

    /// Obtains a new access token, returning the one to replay with.
    ///
    /// `rejected` is the access token the server refused. If the stored
    /// token differs, another request refreshed in the meantime and the
    /// stored token is used without calling the server again.
    pub async fn refresh_session(&self, rejected: Option<&str>) -> Result<String, HttpError> {
        let _guard = self.refresh_lock.lock().await;

        let Some(current) = self.store.load().await else {
            return Err(HttpError::SessionExpired);
        };

        if rejected != Some(current.access_token.as_str()) {
            debug!("Session was refreshed by a concurrent request");
            return Ok(current.access_token);
        }

        let request = RefreshRequest {
            refresh_token: current.refresh_token,
        };
        // Refresh tokens are single-use, so this request is never retried
        let result = match self
            .http
            .send(Method::POST, &self.url(REFRESH_PATH), Some(&request), None)
            .await
        {
            Ok(response) => response
                .json::<ApiResponse<TokenPair>>()
                .await
                .map_err(|e| HttpError::ParseError(e.to_string())),
            Err(e) => Err(e),
        };

        let tokens = match result {
            Ok(ApiResponse {
                data: Some(tokens), ..
            }) => tokens,
            Ok(_) => {
                warn!("Token refresh answered without tokens");
                self.expire().await;
                return Err(HttpError::SessionExpired);
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.expire().await;
                return Err(HttpError::SessionExpired);
            }
        };

        if let Err(e) = self
            .store
            .save(SessionTokens {
                access_token: tokens.access_token.clone(),
                refresh_token: tokens.refresh_token,
            })
            .await
        {
            warn!("Failed to persist refreshed tokens: {}", e);
        }

        info!("Access token refreshed");
        Ok(tokens.access_token)
    }

    async fn expire(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear token store: {}", e);
        }
    }
}
