use super::error::HttpError;
use super::retry::{with_retry, RetryConfig, RetryError};
use reqwest::{header::HeaderMap, redirect, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    default_timeout: Duration,
    retry_config: RetryConfig,
}

pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    retry_config: Option<RetryConfig>,
    headers: Option<HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            timeout: None,
            retry_config: None,
            headers: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = Some(retry_config);
        self
    }

    pub fn with_default_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn build(self) -> anyhow::Result<HttpClient> {
        // Redirects surface as HttpError::Redirect
        let mut client_builder = reqwest::Client::builder().redirect(redirect::Policy::none());

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(headers) = self.headers {
            client_builder = client_builder.default_headers(headers);
        }

        let client = client_builder.build()?;

        Ok(HttpClient {
            client,
            default_timeout: self.timeout.unwrap_or(Duration::from_secs(30)),
            retry_config: self.retry_config.unwrap_or_default(),
        })
    }
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    pub fn new() -> anyhow::Result<Self> {
        Self::builder().build()
    }

    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        Self::builder().with_timeout(timeout).build()
    }

    /// Turns a non-success response into an [`HttpError`].
    async fn check_response(response: Response) -> Result<Response, HttpError> {
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|l| l.to_str().ok())
                .unwrap_or("unknown location")
                .to_string();
            return Err(HttpError::Redirect {
                status: status.as_u16(),
                location,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::from_body(status, &body));
        }

        Ok(response)
    }

    /// Sends a single request without retrying.
    pub async fn send<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> Result<Response, HttpError>
    where
        B: Serialize + ?Sized,
    {
        debug!("{} request to {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .timeout(self.default_timeout);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::check_response(response).await
    }

    /// Sends a request with retry logic and deserializes the JSON response.
    pub async fn request_json<B, R>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> Result<R, RetryError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        with_retry(
            || async {
                let response = self.send(method.clone(), url, body, bearer).await?;
                response
                    .json::<R>()
                    .await
                    .map_err(|e| HttpError::ParseError(e.to_string()))
            },
            &self.retry_config,
        )
        .await
    }

    /// Make a GET request and deserialize JSON response with retry logic
    pub async fn get_json<R>(&self, url: &str) -> Result<R, RetryError>
    where
        R: DeserializeOwned,
    {
        self.request_json::<(), R>(Method::GET, url, None, None)
            .await
    }

    /// Make a POST request and deserialize JSON response with retry logic
    pub async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, RetryError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request_json(Method::POST, url, Some(body), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client() -> HttpClient {
        HttpClient::builder()
            .with_retry_config(RetryConfig {
                max_retries: 3,
                initial_delay_ms: 1,
                max_delay_ms: 2,
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_json_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let value: Value = client()
            .request_json::<(), Value>(
                Method::GET,
                &format!("{}/api/v1/auth/me", server.uri()),
                None,
                Some("token-1"),
            )
            .await
            .unwrap();
        assert_eq!(value["success"], true);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": 1})))
            .mount(&server)
            .await;

        let value: Value = client()
            .get_json(&format!("{}/flaky", server.uri()))
            .await
            .unwrap();
        assert_eq!(value["ok"], 1);
    }

    #[tokio::test]
    async fn test_error_body_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"success": false, "message": "Invalid credentials"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client()
            .post_json::<_, Value>(
                &format!("{}/auth/login", server.uri()),
                &json!({"email": "a@b.c", "password": "x"}),
            )
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.http_error().to_string(), "HTTP 401: Invalid credentials");
    }

    #[tokio::test]
    async fn test_redirect_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/moved"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", "https://careflow.example.com"),
            )
            .mount(&server)
            .await;

        let err = client()
            .get_json::<Value>(&format!("{}/moved", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(
            err.http_error().redirect_location(),
            Some("https://careflow.example.com")
        );
    }
}
