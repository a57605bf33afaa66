//! Pre-navigation access control

use crate::config::RouteConfig;
use crate::navigation::{Location, REDIRECT_QUERY};
use crate::store::AuthStore;
use std::collections::HashMap;
use tracing::debug;

/// Access policy of one route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Only signed-in users may enter
    pub requires_auth: bool,
    /// Only signed-out users may enter (login, signup)
    pub guest: bool,
}

impl RouteMeta {
    pub const PROTECTED: Self = Self {
        requires_auth: true,
        guest: false,
    };

    pub const GUEST: Self = Self {
        requires_auth: false,
        guest: true,
    };

    pub const PUBLIC: Self = Self {
        requires_auth: false,
        guest: false,
    };
}

/// Route policies keyed by path. Unlisted paths require authentication.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteMeta>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Login and signup are guest-only; everything else, home included,
    /// is protected until registered as public
    pub fn standard(routes: &RouteConfig) -> Self {
        Self::new()
            .route(&routes.home_path, RouteMeta::PROTECTED)
            .route(&routes.login_path, RouteMeta::GUEST)
            .route(&routes.signup_path, RouteMeta::GUEST)
    }

    #[must_use]
    pub fn route(mut self, path: impl Into<String>, meta: RouteMeta) -> Self {
        self.routes.insert(path.into(), meta);
        self
    }

    pub fn meta(&self, path: &str) -> RouteMeta {
        self.routes
            .get(path)
            .copied()
            .unwrap_or(RouteMeta::PROTECTED)
    }
}

/// Outcome of evaluating a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Location),
}

/// Decides whether a navigation may proceed given the session state
#[derive(Debug, Clone)]
pub struct RouteGuard {
    table: RouteTable,
    login: Location,
    home: Location,
}

impl RouteGuard {
    pub fn new(table: RouteTable, routes: &RouteConfig) -> Self {
        Self {
            table,
            login: Location::new(&routes.login_path),
            home: Location::new(&routes.home_path),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Evaluate one navigation attempt.
    ///
    /// A protected route reached without a confirmed session runs
    /// [`AuthStore::check_auth`] first. A session rehydrated from cache
    /// counts as unconfirmed until that check succeeds.
    pub async fn evaluate(&self, store: &AuthStore, to: &Location) -> GuardDecision {
        let meta = self.table.meta(to.path());
        let authenticated = store.is_authenticated();

        if meta.requires_auth && (!authenticated || store.needs_revalidation()) {
            return match store.check_auth().await {
                Ok(_) => GuardDecision::Allow,
                Err(err) => {
                    debug!(to = %to, error = %err, "session check failed, redirecting to login");
                    GuardDecision::Redirect(
                        self.login
                            .clone()
                            .with_query(REDIRECT_QUERY, to.full_path()),
                    )
                }
            };
        }

        if meta.guest && authenticated {
            debug!(to = %to, "already signed in, redirecting home");
            return GuardDecision::Redirect(self.home.clone());
        }

        GuardDecision::Allow
    }
}
