//! Calls against the careflow API, unwrapping the response envelope.
//!
//! Authenticated calls go through the [`AuthenticatedClient`] of the
//! context, so a rejected access token is refreshed once and the call is
//! replayed before an error reaches the user.
//!
//! [`AuthenticatedClient`]: careflow_core::http::AuthenticatedClient

use anyhow::anyhow;
use careflow_core::http::{HttpError, RetryError};
use careflow_types::ApiResponse;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};

use crate::context::AppContext;

/// Turns a failed call into the message shown to the user. The server's own
/// message is preferred, it is more specific than the generic text.
pub fn api_error(err: RetryError) -> anyhow::Error {
    match err.http_error() {
        HttpError::Http {
            status, message, ..
        } if !message.is_empty() => anyhow!("{} (HTTP {})", message, status),
        other => anyhow!("{}", other.user_message()),
    }
}

pub fn into_data<T>(response: ApiResponse<T>) -> anyhow::Result<T> {
    match response {
        ApiResponse {
            success: true,
            data: Some(data),
            ..
        } => Ok(data),
        ApiResponse { message, .. } if !message.is_empty() => Err(anyhow!(message)),
        _ => Err(anyhow!("Server answered without data")),
    }
}

pub async fn get<R>(context: &AppContext, path: &str) -> anyhow::Result<R>
where
    R: DeserializeOwned,
{
    let response = context
        .client()
        .get::<ApiResponse<R>>(path)
        .await
        .map_err(api_error)?;
    into_data(response)
}

pub async fn post<B, R>(context: &AppContext, path: &str, body: &B) -> anyhow::Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = context
        .client()
        .post::<B, ApiResponse<R>>(path, body)
        .await
        .map_err(api_error)?;
    into_data(response)
}

pub async fn put<B, R>(context: &AppContext, path: &str, body: &B) -> anyhow::Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = context
        .client()
        .put::<B, ApiResponse<R>>(path, body)
        .await
        .map_err(api_error)?;
    into_data(response)
}

/// POST to an endpoint that answers without data, returning its message.
pub async fn post_ack<B>(context: &AppContext, path: &str, body: &B) -> anyhow::Result<String>
where
    B: Serialize + ?Sized,
{
    let response = context
        .client()
        .post::<B, ApiResponse<serde_json::Value>>(path, body)
        .await
        .map_err(api_error)?;
    if response.success {
        Ok(response.message)
    } else {
        Err(anyhow!(response.message))
    }
}

/// POST to an endpoint that works without a session, e.g. login.
pub async fn public_post<B, R>(context: &AppContext, path: &str, body: &B) -> anyhow::Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = context
        .client()
        .public_request::<B, ApiResponse<R>>(Method::POST, path, Some(body))
        .await
        .map_err(api_error)?;
    into_data(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_data() {
        assert_eq!(into_data(ApiResponse::ok(3)).unwrap(), 3);

        let err = into_data::<u32>(ApiResponse::error("Role not found")).unwrap_err();
        assert_eq!(err.to_string(), "Role not found");
    }

    #[test]
    fn test_api_error_prefers_server_message() {
        let err = api_error(RetryError::NonRetriable(HttpError::http(
            403,
            "Missing permission: create_users",
        )));
        assert_eq!(err.to_string(), "Missing permission: create_users (HTTP 403)");

        let err = api_error(RetryError::NonRetriable(HttpError::SessionExpired));
        assert_eq!(err.to_string(), "Session expired. Please login again.");
    }
}
