//! Portal HTTP client

pub mod auth;
pub mod error;
pub mod interceptor;

use error::ClientError;
use interceptor::SessionHooks;
use reqwest::cookie::Jar;
use reqwest::{Client, ClientBuilder, Method, Response, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default transport deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// A replayable description of one API call.
///
/// Unlike a `reqwest::RequestBuilder` this can be sent again verbatim, which
/// the 401 interceptor needs in order to resend the original request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    intercept: bool,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            intercept: true,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Let a 401 surface directly instead of triggering a session refresh
    #[must_use]
    pub fn without_refresh(mut self) -> Self {
        self.intercept = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the interceptor has already resent this request once
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn intercepts(&self) -> bool {
        self.intercept
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

/// JSON client for the auth API.
///
/// Credentials travel in the cookie jar owned by the underlying transport;
/// nothing in this crate sets an authorization header.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    hooks: Option<Arc<dyn SessionHooks>>,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Return a copy of this client that consults `hooks` when a request is
    /// rejected with 401. The copy shares the connection pool and cookie jar.
    #[must_use]
    pub fn with_session_hooks(&self, hooks: Arc<dyn SessionHooks>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            hooks: Some(hooks),
        }
    }

    pub(crate) fn hooks(&self) -> Option<&Arc<dyn SessionHooks>> {
        self.hooks.as_ref()
    }

    /// Send a request and decode its JSON response
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }

    /// Send a request whose response body is irrelevant
    pub async fn send_empty(&self, request: ApiRequest) -> Result<(), ClientError> {
        self.execute(request).await.map(drop)
    }

    /// Issue exactly one HTTP exchange for `request`.
    ///
    /// Non-success statuses are turned into [`ClientError`]s here; the
    /// interceptor decides what to do with them.
    pub(crate) async fn dispatch(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(
            method = %request.method,
            path = %request.path,
            retried = request.retried,
            "sending api request"
        );

        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            debug!(path = %request.path, status = status.as_u16(), "api request rejected");
            Err(ClientError::from_response(status, &body))
        }
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    cookie_jar: Option<Arc<Jar>>,
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Share an existing cookie jar instead of creating a private one
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Configuration(format!(
                "base_url must be an absolute http(s) URL, got {base_url:?}"
            )));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let jar = self.cookie_jar.unwrap_or_default();
        let client = ClientBuilder::new()
            .default_headers(headers)
            .cookie_provider(jar)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(
                self.user_agent
                    .unwrap_or_else(|| format!("portal-client/{}", env!("CARGO_PKG_VERSION"))),
            )
            .build()?;

        Ok(ApiClient {
            client,
            base_url,
            hooks: None,
        })
    }
}
