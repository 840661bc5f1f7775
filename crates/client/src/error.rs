//! Error types for the DigiKey client.
//!
//! Two layers: [`DigiKeyError`] is what the library returns from setup and
//! token acquisition, [`UpstreamError`] is the structured, serializable
//! result of a relayed API call that did not succeed.

use serde::{Deserialize, Serialize};

/// Result type for client operations.
pub type DigiKeyResult<T> = Result<T, DigiKeyError>;

/// Result of a relayed API call.
pub type RelayResult = Result<serde_json::Value, UpstreamError>;

/// Error types that can occur when using the DigiKey client.
#[derive(Debug, thiserror::Error)]
pub enum DigiKeyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid or missing configuration (credentials, base URL).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The token endpoint rejected the credential exchange.
    #[error("Authentication failed (status {status}): {message}")]
    Authentication { status: u16, message: String },

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Connection timeout.
    #[error("Request timed out")]
    Timeout,

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl DigiKeyError {
    /// Classify a transport failure, keeping timeouts distinct.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }

    /// Check if this error is a fatal configuration problem.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::InvalidUrl(_))
    }
}

/// Category of a failed relayed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Upstream answered 404.
    NotFound,
    /// Token rejected after the retry, or the token exchange failed.
    AuthenticationError,
    /// Any other non-2xx answer.
    ApiError,
    /// Network failure reaching the provider.
    TransportError,
    /// Request exceeded the configured timeout.
    Timeout,
    /// Missing or invalid credentials.
    ConfigurationError,
    /// 2xx answer whose body is not JSON.
    InvalidResponse,
    /// Caller-supplied input could not be turned into a request.
    InvalidRequest,
}

/// Structured error returned in place of an upstream payload.
///
/// Serializes to `{error, message, status_code, details?, url?}` so the tool
/// layer can hand it to the agent unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamError {
    pub error: ErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl UpstreamError {
    /// Structured "not found" result for a 404.
    pub fn not_found(url: &str) -> Self {
        Self {
            error: ErrorKind::NotFound,
            message: format!("Resource not found: {}", url),
            status_code: Some(404),
            details: None,
            url: Some(url.to_string()),
        }
    }

    /// Create an error from a non-2xx status code and response body.
    ///
    /// The body is kept as parsed JSON when possible, otherwise as raw text.
    pub fn from_response(status: u16, url: &str, body: &str) -> Self {
        if status == 404 {
            return Self::not_found(url);
        }

        let (error, message) = if status == 401 {
            (
                ErrorKind::AuthenticationError,
                "Access token rejected by upstream after refresh".to_string(),
            )
        } else {
            (ErrorKind::ApiError, format!("Upstream returned status {}", status))
        };

        Self {
            error,
            message,
            status_code: Some(status),
            details: parse_error_body(body),
            url: Some(url.to_string()),
        }
    }

    /// Classify a transport failure for the given URL.
    pub fn transport(url: &str, err: &reqwest::Error) -> Self {
        let (error, message) = if err.is_timeout() {
            (ErrorKind::Timeout, format!("Request to upstream timed out: {}", err))
        } else {
            (ErrorKind::TransportError, format!("Failed to reach upstream: {}", err))
        };

        Self {
            error,
            message,
            status_code: None,
            details: None,
            url: Some(url.to_string()),
        }
    }

    /// A 2xx response whose body could not be parsed.
    pub fn invalid_response(status: u16, url: &str, body: &str) -> Self {
        Self {
            error: ErrorKind::InvalidResponse,
            message: "Upstream returned a body that is not valid JSON".to_string(),
            status_code: Some(status),
            details: parse_error_body(body),
            url: Some(url.to_string()),
        }
    }

    /// Caller input that cannot be sent upstream.
    pub fn invalid_request(url: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorKind::InvalidRequest,
            message: message.into(),
            status_code: None,
            details: None,
            url: url.map(str::to_string),
        }
    }

    /// Convert a token-acquisition failure into a per-call result.
    pub fn from_token_error(url: &str, err: &DigiKeyError) -> Self {
        let (error, status_code) = match err {
            DigiKeyError::Config(_) | DigiKeyError::InvalidUrl(_) => {
                (ErrorKind::ConfigurationError, None)
            }
            DigiKeyError::Authentication { status, .. } => {
                (ErrorKind::AuthenticationError, Some(*status))
            }
            DigiKeyError::Timeout => (ErrorKind::Timeout, None),
            DigiKeyError::Json(_) => (ErrorKind::AuthenticationError, None),
            DigiKeyError::Http(_) | DigiKeyError::InvalidInput(_) => {
                (ErrorKind::TransportError, None)
            }
        };

        Self {
            error,
            message: format!("Could not obtain access token: {}", err),
            status_code,
            details: None,
            url: Some(url.to_string()),
        }
    }

    /// Render as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        // Plain struct of strings, numbers and values; serialization cannot fail.
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({
                "error": "invalid_response",
                "message": self.message,
                "status_code": self.status_code,
            })
        })
    }
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(status) => write!(f, "{} (status {})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for UpstreamError {}

/// Best-effort parse of an error body: JSON when possible, raw text otherwise.
fn parse_error_body(body: &str) -> Option<serde_json::Value> {
    if body.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => Some(value),
        Err(_) => Some(serde_json::Value::String(body.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_not_found_carries_url() {
        let err = UpstreamError::from_response(404, "https://api.example.com/x", "");
        assert_eq!(err.error, ErrorKind::NotFound);
        assert_eq!(err.status_code, Some(404));
        assert_eq!(err.url.as_deref(), Some("https://api.example.com/x"));
    }

    #[test]
    fn test_json_error_body_is_parsed() {
        let body = r#"{"title":"Bad Request","status":400}"#;
        let err = UpstreamError::from_response(400, "https://api.example.com/x", body);
        assert_eq!(err.error, ErrorKind::ApiError);
        assert_eq!(err.details, Some(json!({"title": "Bad Request", "status": 400})));
    }

    #[test]
    fn test_text_error_body_falls_back_to_string() {
        let err = UpstreamError::from_response(502, "https://api.example.com/x", "Bad Gateway");
        assert_eq!(err.details, Some(json!("Bad Gateway")));
    }

    #[test]
    fn test_second_401_is_authentication_error() {
        let err = UpstreamError::from_response(401, "https://api.example.com/x", "");
        assert_eq!(err.error, ErrorKind::AuthenticationError);
        assert_eq!(err.status_code, Some(401));
        assert!(err.details.is_none());
    }

    #[test]
    fn test_json_shape() {
        let value = UpstreamError::from_response(500, "https://api.example.com/x", "oops").to_json();
        assert_eq!(value["error"], "api_error");
        assert_eq!(value["status_code"], 500);
        assert_eq!(value["details"], "oops");
        assert!(value["message"].is_string());
    }

    #[test]
    fn test_token_error_mapping() {
        let err = UpstreamError::from_token_error(
            "https://api.example.com/x",
            &DigiKeyError::Config("CLIENT_ID is not set".to_string()),
        );
        assert_eq!(err.error, ErrorKind::ConfigurationError);

        let err = UpstreamError::from_token_error(
            "https://api.example.com/x",
            &DigiKeyError::Authentication {
                status: 401,
                message: "invalid_client".to_string(),
            },
        );
        assert_eq!(err.error, ErrorKind::AuthenticationError);
        assert_eq!(err.status_code, Some(401));
    }
}
