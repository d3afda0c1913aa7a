//! HTTP error types that preserve status code information throughout the error chain.
//!
//! Callers inspect the status code instead of parsing error strings, and
//! [`HttpError::user_message`] turns any error into the text shown to a
//! person.
//!
//! ```
//! use careflow_core::http::HttpError;
//!
//! let err = HttpError::http(404, "Not found");
//! assert_eq!(err.status_code(), Some(404));
//! assert!(err.is_client_error());
//! assert_eq!(err.user_message().message, "The requested resource was not found.");
//! ```

use reqwest::StatusCode;
use serde::Serialize;

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";
const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// HTTP client error types that preserve status code information
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// HTTP error response with status code and the message sent by the server
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        /// Field level validation errors, one `field: problem` per line
        details: Option<String>,
    },

    /// Network-level error (connection, DNS, etc.)
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Failed to parse response body
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server returned a redirect response
    #[error("Server returned a {status} redirect to {location}. Please update your server URL to use the correct address.")]
    Redirect { status: u16, location: String },

    /// The access token was rejected and could not be refreshed
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,
}

/// Message suitable for showing to a user, derived from an [`HttpError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMessage {
    pub message: String,
    pub details: Option<String>,
    pub code: String,
}

impl UserMessage {
    fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            code: code.into(),
        }
    }
}

impl std::fmt::Display for UserMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}\n{}", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        // If the reqwest error has a status code, preserve it as Http variant
        if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
                details: None,
            }
        } else if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

impl HttpError {
    /// Create an HTTP error from status code and message
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Create an HTTP error from a StatusCode and message
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::http(status.as_u16(), message)
    }

    /// Build an error from a failed response body.
    ///
    /// Uses `message`, then `error` of a JSON body and falls back to a short
    /// plain text body. `errors` (field → message or list of messages) is
    /// flattened into `details`.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        let mut message = None;
        let mut details = None;

        if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
            message = json
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .or_else(|| json.get("error").and_then(|e| e.as_str()))
                .map(str::to_string);

            if let Some(errors) = json.get("errors").and_then(|e| e.as_object()) {
                let lines: Vec<String> = errors
                    .iter()
                    .map(|(field, msgs)| match msgs {
                        serde_json::Value::Array(list) => {
                            let msgs: Vec<_> = list.iter().filter_map(|m| m.as_str()).collect();
                            format!("{}: {}", field, msgs.join(", "))
                        }
                        serde_json::Value::String(msg) => format!("{}: {}", field, msg),
                        other => format!("{}: {}", field, other),
                    })
                    .collect();
                if !lines.is_empty() {
                    details = Some(lines.join("\n"));
                }
            }
        } else if !body.is_empty() && body.len() < 500 {
            message = Some(body.to_string());
        }

        Self::Http {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
            details,
        }
    }

    /// Get the HTTP status code if this is an HTTP error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code()
            .map(|s| (400..500).contains(&s))
            .unwrap_or(false)
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code()
            .map(|s| (500..600).contains(&s))
            .unwrap_or(false)
    }

    /// Check if this is an authentication/authorization error (401 or 403)
    pub fn is_auth_error(&self) -> bool {
        self.status_code()
            .map(|s| s == 401 || s == 403)
            .unwrap_or(false)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout) || matches!(self, Self::Network(e) if e.is_timeout())
    }

    /// Check if this is a network connectivity error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Check if this is a redirect error
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// Get the redirect location if this is a redirect error
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location, .. } => Some(location),
            _ => None,
        }
    }

    pub fn user_message(&self) -> UserMessage {
        match self {
            Self::SessionExpired => UserMessage::new(SESSION_EXPIRED_MESSAGE, "401"),
            Self::Http {
                status,
                message,
                details,
            } => match status {
                401 => UserMessage::new("Your session has expired. Please login again.", "401"),
                403 => UserMessage::new(
                    "You do not have permission to perform this action.",
                    "403",
                ),
                404 => UserMessage::new("The requested resource was not found.", "404"),
                422 => match details {
                    Some(details) => UserMessage {
                        message: "Validation failed".to_string(),
                        details: Some(details.clone()),
                        code: "422".to_string(),
                    },
                    None => UserMessage::new(message.clone(), "422"),
                },
                409 if message == GENERIC_ERROR_MESSAGE => {
                    UserMessage::new("This resource already exists.", "409")
                }
                409 => UserMessage::new(message.clone(), "409"),
                500 => UserMessage::new("Server error. Please try again later.", "500"),
                429 => UserMessage::new(
                    "Too many requests. Please wait a moment and try again.",
                    "429",
                ),
                status => UserMessage::new(message.clone(), status.to_string()),
            },
            Self::Network(_) => UserMessage::new(
                "Network error. Please check your internet connection.",
                "NETWORK_ERROR",
            ),
            Self::Timeout => UserMessage::new(
                "Request timeout. The server took too long to respond.",
                "TIMEOUT",
            ),
            Self::ParseError(_) | Self::Redirect { .. } => {
                UserMessage::new(self.to_string(), "ERROR")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_creation() {
        let err = HttpError::http(404, "Not found");
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: Not found");
    }

    #[test]
    fn test_from_status() {
        let err = HttpError::from_status(StatusCode::BAD_REQUEST, "Invalid input");
        assert_eq!(err.status_code(), Some(400));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_status_classes() {
        assert!(HttpError::http(499, "Custom").is_client_error());
        assert!(!HttpError::http(500, "Server Error").is_client_error());
        assert!(HttpError::http(503, "Service Unavailable").is_server_error());
        assert!(HttpError::http(401, "Unauthorized").is_auth_error());
        assert!(HttpError::http(403, "Forbidden").is_auth_error());
        assert!(HttpError::http(401, "Unauthorized").is_unauthorized());
        assert!(!HttpError::http(403, "Forbidden").is_unauthorized());
        assert!(HttpError::SessionExpired.is_auth_error());
    }

    #[test]
    fn test_timeout_and_parse_errors() {
        let err = HttpError::Timeout;
        assert!(err.is_timeout());
        assert_eq!(err.status_code(), None);

        let err = HttpError::ParseError("Invalid JSON".to_string());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.to_string(), "Failed to parse response: Invalid JSON");
    }

    #[test]
    fn test_redirect_error() {
        let err = HttpError::Redirect {
            status: 301,
            location: "https://example.com/api".to_string(),
        };
        assert!(err.is_redirect());
        assert_eq!(err.redirect_location(), Some("https://example.com/api"));
        assert!(err.to_string().contains("Please update your server URL"));
    }

    #[test]
    fn test_from_body_prefers_message_then_error() {
        let err = HttpError::from_body(
            StatusCode::CONFLICT,
            r#"{"success":false,"message":"Email already registered"}"#,
        );
        assert_eq!(err.user_message().message, "Email already registered");

        let err = HttpError::from_body(StatusCode::BAD_REQUEST, r#"{"error":"bad input"}"#);
        assert_eq!(err.to_string(), "HTTP 400: bad input");

        let err = HttpError::from_body(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.to_string(), "HTTP 502: An error occurred");

        let err = HttpError::from_body(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "HTTP 502: upstream down");
    }

    #[test]
    fn test_validation_details() {
        let err = HttpError::from_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"invalid","errors":{"email":["is required","must be valid"],"password":"too short"}}"#,
        );
        let msg = err.user_message();
        assert_eq!(msg.message, "Validation failed");
        assert_eq!(
            msg.details.as_deref(),
            Some("email: is required, must be valid\npassword: too short")
        );
        assert_eq!(
            msg.to_string(),
            "Validation failed\nemail: is required, must be valid\npassword: too short"
        );

        let err = HttpError::from_body(StatusCode::UNPROCESSABLE_ENTITY, r#"{"message":"bad"}"#);
        assert_eq!(err.user_message().message, "bad");
    }

    #[test]
    fn test_user_messages() {
        let cases = [
            (401, "Your session has expired. Please login again."),
            (403, "You do not have permission to perform this action."),
            (404, "The requested resource was not found."),
            (500, "Server error. Please try again later."),
            (429, "Too many requests. Please wait a moment and try again."),
            (418, "teapot"),
        ];
        for (status, expected) in cases {
            let msg = HttpError::http(status, "teapot").user_message();
            assert_eq!(msg.message, expected);
            assert_eq!(msg.code, status.to_string());
        }

        assert_eq!(
            HttpError::SessionExpired.user_message().message,
            "Session expired. Please login again."
        );
        assert_eq!(HttpError::Timeout.user_message().code, "TIMEOUT");
    }

    #[tokio::test]
    async fn test_from_reqwest_error_with_status() {
        use wiremock::{
            matchers::{method, path},
            Mock, MockServer, ResponseTemplate,
        };

        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/test"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&mock_server)
            .await;

        let response = reqwest::get(format!("{}/test", mock_server.uri()))
            .await
            .unwrap();
        let err = response.error_for_status().unwrap_err();
        let http_err: HttpError = err.into();

        assert_eq!(http_err.status_code(), Some(404));
        assert!(matches!(http_err, HttpError::Http { .. }));
    }
}
