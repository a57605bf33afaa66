//! Session error types

use portal_http::ClientError;
use std::path::PathBuf;
use thiserror::Error;

/// Broad class of an [`AuthError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// Network failure or timeout
    Transport,
    /// Credentials rejected or session gone
    Unauthorized,
    /// Request rejected by the server or by local checks
    Validation,
    /// Server-side failure
    Server,
}

/// A failed session operation, carrying a message fit to show a user.
///
/// Cheap to clone so that one refresh outcome can be handed to every caller
/// waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthError {
    kind: AuthErrorKind,
    message: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Normalise a transport-level error: the server's message when it sent
    /// one, `fallback` otherwise.
    pub fn from_client(error: &ClientError, fallback: &str) -> Self {
        let kind = match error {
            ClientError::Transport(_) | ClientError::Serialization(_) => AuthErrorKind::Transport,
            ClientError::Unauthorized { .. } | ClientError::RefreshFailed { .. } => {
                AuthErrorKind::Unauthorized
            }
            ClientError::Validation { .. } | ClientError::Configuration(_) => {
                AuthErrorKind::Validation
            }
            ClientError::Server { .. } => AuthErrorKind::Server,
        };
        let message = error.server_message().unwrap_or(fallback);
        Self::new(kind, message)
    }

    pub const fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AuthError> for ClientError {
    fn from(error: AuthError) -> Self {
        Self::RefreshFailed {
            message: error.message,
        }
    }
}

/// Failure to read or write the cached session
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt session cache: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Platform directories could not be determined")]
    PlatformDirsNotFound,
}
