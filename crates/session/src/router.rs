//! Guarded in-app router

use crate::guard::{GuardDecision, RouteGuard};
use crate::navigation::{Location, Navigator};
use crate::store::AuthStore;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, warn};

/// Guard redirects followed before a navigation is abandoned
const MAX_REDIRECTS: usize = 4;

/// Commits navigations after running them through the [`RouteGuard`].
///
/// Also the store's [`Navigator`]: pushes from store operations are queued
/// and committed by [`Router::settle`], so the guard never runs inside a
/// store operation.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    guard: RouteGuard,
    current: RwLock<Location>,
    pending: Mutex<VecDeque<Location>>,
    history: Mutex<VecDeque<Location>>,
}

impl Router {
    /// Committed locations kept by [`Router::history`]
    pub const HISTORY_LIMIT: usize = 100;

    pub fn new(guard: RouteGuard) -> Self {
        Self::starting_at(guard, Location::new("/"))
    }

    /// Start from `location` without running the guard, as when a page is
    /// first opened at some URL
    pub fn starting_at(guard: RouteGuard, location: Location) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                guard,
                current: RwLock::new(location),
                pending: Mutex::new(VecDeque::new()),
                history: Mutex::new(VecDeque::with_capacity(Self::HISTORY_LIMIT)),
            }),
        }
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.inner.guard
    }

    /// Navigate to `to`, following guard redirects, and return where the
    /// user ended up
    pub async fn navigate(&self, store: &AuthStore, to: impl Into<Location>) -> Location {
        let mut target = to.into();

        for _ in 0..MAX_REDIRECTS {
            match self.inner.guard.evaluate(store, &target).await {
                GuardDecision::Allow => {
                    self.commit(target.clone());
                    return target;
                }
                GuardDecision::Redirect(next) => {
                    debug!(from = %target, to = %next, "navigation redirected");
                    target = next;
                }
            }
        }

        warn!(to = %target, "too many guard redirects, navigation abandoned");
        self.current()
    }

    /// Commit every navigation queued by [`Navigator::push`], in order.
    /// Returns the final location if anything was queued.
    pub async fn settle(&self, store: &AuthStore) -> Option<Location> {
        let mut last = None;
        while let Some(next) = self.pop_pending() {
            last = Some(self.navigate(store, next).await);
        }
        last
    }

    /// Navigations requested but not yet committed
    pub fn pending(&self) -> Vec<Location> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// The last [`Router::HISTORY_LIMIT`] committed locations, oldest first
    pub fn history(&self) -> Vec<Location> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    fn pop_pending(&self) -> Option<Location> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn commit(&self, location: Location) {
        debug!(to = %location, "navigation committed");
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = location.clone();
        let mut history = self
            .inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if history.len() == Self::HISTORY_LIMIT {
            history.pop_front();
        }
        history.push_back(location);
    }
}

impl Navigator for Router {
    fn current(&self) -> Location {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, to: Location) {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(to);
    }
}
