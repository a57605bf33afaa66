//! Web auth API client methods

use super::{ApiClient, ApiRequest, ClientError};
use crate::types::{LoginRequest, PasswordChangeRequest, SignupRequest, UserSummary};

pub const SIGNUP_PATH: &str = "/auth/web/signup";
pub const LOGIN_PATH: &str = "/auth/web/login";
pub const REFRESH_PATH: &str = "/auth/web/refresh";
pub const LOGOUT_PATH: &str = "/auth/web/logout";
pub const PASSWORD_PATH: &str = "/auth/web/password";
pub const ME_PATH: &str = "/user/me";

impl ApiClient {
    /// Register a new account; the server sets the session cookie on success
    pub async fn signup(&self, request: &SignupRequest) -> Result<UserSummary, ClientError> {
        let req = ApiRequest::post(SIGNUP_PATH).json(request)?.without_refresh();
        self.send(req).await
    }

    /// Log in with email and password
    pub async fn login(&self, request: &LoginRequest) -> Result<UserSummary, ClientError> {
        let req = ApiRequest::post(LOGIN_PATH).json(request)?.without_refresh();
        self.send(req).await
    }

    /// Renew the session cookie
    pub async fn refresh(&self) -> Result<(), ClientError> {
        self.send_empty(ApiRequest::post(REFRESH_PATH).without_refresh())
            .await
    }

    /// End the server-side session
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.send_empty(ApiRequest::post(LOGOUT_PATH).without_refresh())
            .await
    }

    /// Change the signed-in user's password (retried once after a refresh on 401)
    pub async fn change_password(&self, request: &PasswordChangeRequest) -> Result<(), ClientError> {
        self.send_empty(ApiRequest::post(PASSWORD_PATH).json(request)?)
            .await
    }

    /// Fetch the signed-in user (retried once after a refresh on 401)
    pub async fn me(&self) -> Result<UserSummary, ClientError> {
        self.send(ApiRequest::get(ME_PATH)).await
    }

    /// Probe the signed-in user without the refresh interceptor
    pub async fn probe_me(&self) -> Result<UserSummary, ClientError> {
        self.send(ApiRequest::get(ME_PATH).without_refresh()).await
    }
}
