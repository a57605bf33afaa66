//! The auth session store
//!
//! DESIGN
//! ======
//! One [`AuthStore`] owns the process-wide [`Session`]. Nothing else can
//! write it: callers read snapshots or subscribe to a watch channel, and the
//! store's operations are the only mutators. Every change is written through
//! to the configured [`SessionStorage`].
//!
//! The store installs itself as the HTTP client's [`SessionHooks`], so a 401
//! on any intercepted request refreshes through [`AuthStore::refresh_token`].
//! That method shares one in-flight refresh between all concurrent callers;
//! a check racing an intercepted request never refreshes twice. Expiry is
//! shared the same way: however many intercepted requests joined a failed
//! refresh, the session is logged out once.
//!
//! There is no operation-level locking. Two overlapping logins both run and
//! the response that resolves last wins.

use crate::config::RouteConfig;
use crate::error::{AuthError, AuthErrorKind};
use crate::navigation::{Location, Navigator, REDIRECT_QUERY, safe_redirect};
use crate::session::Session;
use crate::storage::SessionStorage;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use portal_http::{
    ApiClient, ClientError, LoginRequest, PasswordChangeRequest, SessionHooks, SignupRequest,
    UserSummary,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::watch;
use tracing::{debug, info, warn};

const LOGIN_FALLBACK: &str = "An error occurred while logging in.";
const SIGNUP_FALLBACK: &str = "An error occurred while signing up.";
const PASSWORD_FALLBACK: &str = "An error occurred while changing the password.";
const CHECK_FALLBACK: &str = "Your session could not be verified.";
const REFRESH_FALLBACK: &str = "Your session has expired. Please log in again.";
const PASSWORD_MISMATCH: &str = "The new password and its confirmation do not match.";

type RefreshFlight = Shared<BoxFuture<'static, Result<(), AuthError>>>;

/// Client-side owner of the auth session. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    api: ApiClient,
    state: watch::Sender<Session>,
    navigator: Arc<dyn Navigator>,
    storage: Arc<dyn SessionStorage>,
    routes: RouteConfig,
    refresh: Mutex<Option<RefreshFlight>>,
    /// Failed refresh flights so far
    refresh_failures: AtomicU64,
    /// Failed flights already answered with a logout
    expired_through: AtomicU64,
    needs_revalidation: AtomicBool,
}

impl AuthStore {
    /// Create a store, rehydrating any cached session from `storage`.
    ///
    /// `api` is wrapped so that its 401 interceptor refreshes through this
    /// store; the caller's copy is left untouched.
    pub fn new(
        api: ApiClient,
        navigator: Arc<dyn Navigator>,
        storage: Arc<dyn SessionStorage>,
        routes: RouteConfig,
    ) -> Self {
        let cached = match storage.load() {
            Ok(cached) => cached.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable session cache");
                Session::default()
            }
        };
        let needs_revalidation = cached.is_authenticated();
        if needs_revalidation {
            debug!("rehydrated cached session, pending revalidation");
        }

        let inner = Arc::new_cyclic(|weak: &Weak<StoreInner>| {
            let hooks: Arc<dyn SessionHooks> = Arc::new(StoreHooks {
                store: weak.clone(),
            });
            StoreInner {
                api: api.with_session_hooks(hooks),
                state: watch::Sender::new(cached),
                navigator,
                storage,
                routes,
                refresh: Mutex::new(None),
                refresh_failures: AtomicU64::new(0),
                expired_through: AtomicU64::new(0),
                needs_revalidation: AtomicBool::new(needs_revalidation),
            }
        });

        Self { inner }
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Observe session changes
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Whether the session was rehydrated from cache and not yet confirmed
    /// with the server
    pub fn needs_revalidation(&self) -> bool {
        self.inner.needs_revalidation.load(Ordering::Acquire)
    }

    /// The hooked API client, for callers making their own requests with the
    /// same credentials and 401 recovery
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn routes(&self) -> &RouteConfig {
        &self.inner.routes
    }

    /// Log in and navigate to the pending `redirect` target, or home.
    ///
    /// # Errors
    ///
    /// Returns the server's message, or a generic one, when login fails;
    /// the same message is recorded as the session's last error.
    pub async fn login(&self, credentials: LoginRequest) -> Result<UserSummary, AuthError> {
        let _loading = self.begin(true);

        match self.inner.api.login(&credentials).await {
            Ok(user) => {
                self.sign_in(user.clone());
                let current = self.inner.navigator.current();
                let target = safe_redirect(current.query(REDIRECT_QUERY))
                    .unwrap_or_else(|| Location::new(&self.inner.routes.home_path));
                info!(email = %user.email, to = %target, "logged in");
                self.inner.navigator.push(target);
                Ok(user)
            }
            Err(err) => Err(self.fail(&err, LOGIN_FALLBACK)),
        }
    }

    /// Register a new account and navigate home.
    ///
    /// # Errors
    ///
    /// Same as [`AuthStore::login`].
    pub async fn signup(&self, fields: SignupRequest) -> Result<UserSummary, AuthError> {
        let _loading = self.begin(true);

        match self.inner.api.signup(&fields).await {
            Ok(user) => {
                self.sign_in(user.clone());
                info!(email = %user.email, "signed up");
                self.inner
                    .navigator
                    .push(Location::new(&self.inner.routes.home_path));
                Ok(user)
            }
            Err(err) => Err(self.fail(&err, SIGNUP_FALLBACK)),
        }
    }

    /// End the session. Always succeeds locally; a backend failure is only
    /// logged.
    pub async fn logout(&self) {
        let _loading = self.begin(false);

        if let Err(err) = self.inner.api.logout().await {
            warn!(error = %err, "logout request failed");
        }

        self.sign_out();
        info!("logged out");
        self.inner
            .navigator
            .push(Location::new(&self.inner.routes.login_path));
    }

    /// Confirm the session with the server, refreshing once if needed.
    ///
    /// # Errors
    ///
    /// Returns the refresh or re-check failure after clearing the session.
    pub async fn check_auth(&self) -> Result<UserSummary, AuthError> {
        let _loading = self.begin(false);

        let first = match self.inner.api.probe_me().await {
            Ok(user) => {
                self.sign_in(user.clone());
                return Ok(user);
            }
            Err(err) => err,
        };
        debug!(error = %first, "session check failed, attempting refresh");

        let outcome = match self.refresh_token().await {
            Ok(_) => self
                .inner
                .api
                .probe_me()
                .await
                .map_err(|err| AuthError::from_client(&err, CHECK_FALLBACK)),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(user) => {
                self.sign_in(user.clone());
                Ok(user)
            }
            Err(err) => {
                self.sign_out();
                Err(err)
            }
        }
    }

    /// Renew the credential cookie without touching the user.
    ///
    /// Concurrent callers share a single backend refresh call.
    ///
    /// # Errors
    ///
    /// Returns the refresh failure after clearing the session.
    pub async fn refresh_token(&self) -> Result<bool, AuthError> {
        let flight = {
            let mut slot = self
                .inner
                .refresh
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(flight) = slot.as_ref() {
                debug!("joining in-flight session refresh");
                flight.clone()
            } else {
                let api = self.inner.api.clone();
                let flight = async move {
                    api.refresh()
                        .await
                        .map_err(|err| AuthError::from_client(&err, REFRESH_FALLBACK))
                }
                .boxed()
                .shared();
                *slot = Some(flight.clone());
                flight
            }
        };

        let outcome = flight.clone().await;

        {
            let mut slot = self
                .inner
                .refresh
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // Whoever retires the flight counts its failure, exactly once
            if slot.as_ref().is_some_and(|f| f.ptr_eq(&flight)) {
                *slot = None;
                if outcome.is_err() {
                    self.inner.refresh_failures.fetch_add(1, Ordering::AcqRel);
                }
            }
        }

        match outcome {
            Ok(()) => Ok(true),
            Err(err) => {
                warn!(error = %err, "session refresh failed");
                self.sign_out();
                Err(err)
            }
        }
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns a validation error without contacting the server when the
    /// confirmation does not match, otherwise the server's failure.
    pub async fn change_password(&self, request: PasswordChangeRequest) -> Result<(), AuthError> {
        let _loading = self.begin(true);

        if !request.is_confirmed() {
            let err = AuthError::new(AuthErrorKind::Validation, PASSWORD_MISMATCH);
            self.update(|s| s.set_last_error(Some(err.message().to_string())));
            return Err(err);
        }

        self.inner
            .api
            .change_password(&request)
            .await
            .map_err(|err| self.fail(&err, PASSWORD_FALLBACK))
    }

    /// Log out in response to a failed refresh, unless that failure was
    /// already answered by another caller
    async fn expire(&self) {
        let failures = self.inner.refresh_failures.load(Ordering::Acquire);
        let handled = self
            .inner
            .expired_through
            .fetch_max(failures, Ordering::AcqRel);
        if handled >= failures {
            debug!("session already expired for this refresh failure");
            return;
        }
        self.logout().await;
    }

    fn begin(&self, reset_error: bool) -> LoadingGuard<'_> {
        self.update(|s| {
            s.set_loading(true);
            if reset_error {
                s.set_last_error(None);
            }
        });
        LoadingGuard { store: self }
    }

    fn sign_in(&self, user: UserSummary) {
        self.inner.needs_revalidation.store(false, Ordering::Release);
        self.update(|s| s.authenticate(user));
    }

    fn sign_out(&self) {
        self.inner.needs_revalidation.store(false, Ordering::Release);
        self.update(Session::clear);
    }

    fn fail(&self, err: &ClientError, fallback: &str) -> AuthError {
        let error = AuthError::from_client(err, fallback);
        debug!(error = %err, "auth operation failed");
        self.update(|s| s.set_last_error(Some(error.message().to_string())));
        error
    }

    fn update(&self, apply: impl FnOnce(&mut Session)) {
        self.inner.state.send_modify(apply);
        let snapshot = self.session();
        if let Err(err) = self.inner.storage.save(&snapshot) {
            warn!(error = %err, "failed to persist session");
        }
    }
}

/// Clears the loading flag when an operation ends, however it ends
struct LoadingGuard<'a> {
    store: &'a AuthStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.update(|s| s.set_loading(false));
    }
}

/// Interceptor callbacks, holding the store weakly so the client it lives
/// in does not keep the store alive
struct StoreHooks {
    store: Weak<StoreInner>,
}

impl StoreHooks {
    fn store(&self) -> Option<AuthStore> {
        self.store.upgrade().map(|inner| AuthStore { inner })
    }
}

#[async_trait]
impl SessionHooks for StoreHooks {
    async fn refresh(&self) -> Result<(), ClientError> {
        let Some(store) = self.store() else {
            return Err(ClientError::RefreshFailed {
                message: REFRESH_FALLBACK.to_string(),
            });
        };
        store.refresh_token().await.map(drop).map_err(Into::into)
    }

    async fn expire(&self) {
        if let Some(store) = self.store() {
            store.expire().await;
        }
    }
}
