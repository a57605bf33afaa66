//! Recovery from expired sessions
//!
//! When a request comes back 401 the client asks the session owner to
//! refresh the credential cookie and resends the original request once. If
//! the refresh fails the session owner is told the session has expired and
//! the refresh failure is returned to the caller.

use super::error::ClientError;
use super::{ApiClient, ApiRequest};
use async_trait::async_trait;
use reqwest::Response;
use tracing::{debug, warn};

/// Callbacks into whatever owns the session state
#[async_trait]
pub trait SessionHooks: Send + Sync {
    /// Renew the credential channel without a full login
    async fn refresh(&self) -> Result<(), ClientError>;

    /// The session could not be renewed; drop it and return to the login entry
    async fn expire(&self);
}

impl ApiClient {
    /// Send `request`, recovering from a single 401 via the session hooks
    pub(crate) async fn execute(&self, mut request: ApiRequest) -> Result<Response, ClientError> {
        let error = match self.dispatch(&request).await {
            Err(error) if error.is_unauthorized() => error,
            outcome => return outcome,
        };

        if !request.intercepts() || request.is_retried() {
            return Err(error);
        }
        let Some(hooks) = self.hooks() else {
            return Err(error);
        };

        request.mark_retried();
        debug!(path = %request.path(), "request unauthorized, refreshing session");

        if let Err(refresh_error) = hooks.refresh().await {
            warn!(
                path = %request.path(),
                error = %refresh_error,
                "session refresh failed, expiring session"
            );
            hooks.expire().await;
            return Err(refresh_error);
        }

        self.dispatch(&request).await
    }
}
