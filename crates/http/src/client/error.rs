//! Client error types

use crate::types::ErrorBody;
use reqwest::StatusCode;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure or timeout
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server rejected the session credentials (401)
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Server rejected the request (4xx other than 401)
    #[error("Request rejected ({status}): {message}")]
    Validation { status: u16, message: String },

    /// Server failed to handle the request (5xx)
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Silent session refresh failed while recovering from a 401
    #[error("Session refresh failed: {message}")]
    RefreshFailed { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code and the raw response body.
    ///
    /// A JSON body with a `message` field wins; otherwise a non-empty text
    /// body is used verbatim. An empty message means the server gave none.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body);
        match status.as_u16() {
            401 => Self::Unauthorized { message },
            code @ 400..=499 => Self::Validation {
                status: code,
                message,
            },
            code => Self::Server {
                status: code,
                message,
            },
        }
    }

    /// The message the server supplied, if it supplied one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::Validation { message, .. }
            | Self::Server { message, .. }
            | Self::RefreshFailed { message } => {
                Some(message.as_str()).filter(|m| !m.trim().is_empty())
            }
            _ => None,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}

fn extract_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match serde_json::from_str::<ErrorBody>(trimmed) {
        Ok(ErrorBody { message }) => message.unwrap_or_default(),
        Err(_) => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_message_is_extracted() {
        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Email already registered","code":"DUPLICATE"}"#,
        );

        assert!(matches!(err, ClientError::Validation { status: 400, .. }));
        assert_eq!(err.server_message(), Some("Email already registered"));
    }

    #[test]
    fn test_plain_text_body_is_used_verbatim() {
        let err = ClientError::from_response(StatusCode::UNAUTHORIZED, "token expired");
        assert!(err.is_unauthorized());
        assert_eq!(err.server_message(), Some("token expired"));
    }

    #[test]
    fn test_empty_body_has_no_server_message() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, "");
        assert!(matches!(err, ClientError::Server { status: 502, .. }));
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_json_without_message_has_no_server_message() {
        let err = ClientError::from_response(StatusCode::FORBIDDEN, r#"{"error":"nope"}"#);
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.server_message(), None);
    }
}
