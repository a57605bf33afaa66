//! Portal session
//!
//! Client-side authentication state for the Portal web API: an
//! [`AuthStore`] owning the session, a [`Router`] that runs the
//! [`RouteGuard`] before each navigation, and local persistence of the
//! session cache.

pub mod app;
pub mod config;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod router;
pub mod session;
pub mod storage;
pub mod store;

pub use app::{Portal, PortalError};
pub use config::PortalConfig;
pub use error::{AuthError, AuthErrorKind, StorageError};
pub use guard::{GuardDecision, RouteGuard, RouteMeta, RouteTable};
pub use navigation::{Location, Navigator};
pub use router::Router;
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::AuthStore;

pub use portal_http::{
    AddressDto, ApiClient, LoginRequest, PasswordChangeRequest, SignupRequest, UserSummary,
};
