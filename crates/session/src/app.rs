//! Wiring of client, storage, router and store from configuration

use crate::config::PortalConfig;
use crate::error::StorageError;
use crate::guard::{RouteGuard, RouteTable};
use crate::navigation::{Location, Navigator};
use crate::router::Router;
use crate::storage::{FileStorage, SessionStorage};
use crate::store::AuthStore;
use portal_http::ClientError;
use std::sync::Arc;
use thiserror::Error;

/// Failure to assemble a [`Portal`]
#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One client session: the store plus the router that guards navigation
#[derive(Clone)]
pub struct Portal {
    pub store: AuthStore,
    pub router: Router,
}

impl Portal {
    /// Assemble a session from configuration, caching to a file
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL is invalid or no storage
    /// directory can be determined
    pub fn from_config(config: &PortalConfig) -> Result<Self, PortalError> {
        let storage = match &config.storage.dir {
            Some(dir) => FileStorage::in_dir(dir, &config.storage.namespace),
            None => FileStorage::platform(&config.storage.namespace)?,
        };
        Self::with_storage(config, Arc::new(storage))
    }

    /// Assemble a session with an explicit storage backend
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL is invalid
    pub fn with_storage(
        config: &PortalConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, PortalError> {
        let api = config.api.build_client()?;
        let guard = RouteGuard::new(RouteTable::standard(&config.routes), &config.routes);
        let router = Router::new(guard);
        let navigator: Arc<dyn Navigator> = Arc::new(router.clone());
        let store = AuthStore::new(api, navigator, storage, config.routes.clone());
        Ok(Self { store, router })
    }

    /// Commit navigations queued by store operations
    pub async fn settle(&self) -> Option<Location> {
        self.router.settle(&self.store).await
    }
}
