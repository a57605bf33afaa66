//! The client-held session record

use portal_http::UserSummary;
use serde::{Deserialize, Serialize};

/// Current authentication status as seen by this client.
///
/// `authenticated` and `user` always move together: the only ways to change
/// them are [`Session::authenticate`] and [`Session::clear`], and a cached
/// record that disagrees with itself is read back as signed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SessionRecord", into = "SessionRecord")]
pub struct Session {
    user: Option<UserSummary>,
    authenticated: bool,
    loading: bool,
    last_error: Option<String>,
}

impl Session {
    pub fn user(&self) -> Option<&UserSummary> {
        self.user.as_ref()
    }

    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn authenticate(&mut self, user: UserSummary) {
        self.user = Some(user);
        self.authenticated = true;
    }

    pub(crate) fn clear(&mut self) {
        self.user = None;
        self.authenticated = false;
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(crate) fn set_last_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }
}

/// On-disk shape, named after the keys the web client persisted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SessionRecord {
    user: Option<UserSummary>,
    is_authenticated: bool,
    is_loading: bool,
    error: Option<String>,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        let mut session = Self {
            last_error: record.error,
            ..Self::default()
        };
        // Loading never survives a restart; a half-written auth pair is dropped.
        if let (true, Some(user)) = (record.is_authenticated, record.user) {
            session.authenticate(user);
        }
        session
    }
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        Self {
            user: session.user,
            is_authenticated: session.authenticated,
            is_loading: session.loading,
            error: session.last_error,
        }
    }
}
