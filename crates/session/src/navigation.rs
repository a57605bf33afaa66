//! Locations and the navigation seam used by the store

use std::collections::BTreeMap;
use std::fmt;
use url::form_urlencoded;

/// Query key carrying the path to return to after login
pub const REDIRECT_QUERY: &str = "redirect";

/// An in-app location: a path plus query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    path: String,
    query: BTreeMap<String, String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path: if path.is_empty() { "/".to_string() } else { path },
            query: BTreeMap::new(),
        }
    }

    /// Parse `"/path?key=value"`; a `#fragment` is ignored
    pub fn parse(full_path: &str) -> Self {
        let without_fragment = full_path.split('#').next().unwrap_or_default();
        let (path, query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));

        let mut location = Self::new(path);
        location.query = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        location
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Path plus encoded query string
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish();
        format!("{}?{query}", self.path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

impl From<&str> for Location {
    fn from(full_path: &str) -> Self {
        Self::parse(full_path)
    }
}

/// In-app navigation as the session store sees it
pub trait Navigator: Send + Sync {
    /// Where the user currently is
    fn current(&self) -> Location;

    /// Request a navigation. Fire-and-forget: the host decides when and
    /// whether it commits.
    fn push(&self, to: Location);
}

/// Accept a post-login redirect only if it stays inside the app
pub fn safe_redirect(target: Option<&str>) -> Option<Location> {
    target
        .filter(|t| t.starts_with('/') && !t.starts_with("//") && !t.contains('\\'))
        .map(Location::parse)
}
