//! Portal HTTP client
//!
//! A small JSON client for the web auth API. Session credentials are carried
//! by the transport's cookie jar, and requests rejected with 401 are retried
//! once after a silent session refresh (see [`client::interceptor`]).

pub mod client;
pub mod types;

pub use client::error::ClientError;
pub use client::interceptor::SessionHooks;
pub use client::{ApiClient, ApiClientBuilder, ApiRequest};
pub use types::{AddressDto, LoginRequest, PasswordChangeRequest, SignupRequest, UserSummary};
