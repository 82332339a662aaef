//! Authentication: OAuth2 provider login, demo login and signed-cookie sessions.
//!
//! This module provides:
//! - JWT signing for the session and OAuth2 state cookies
//! - the `IdentityProvider` seam and its Google implementation
//! - `AuthService` for allowlist checks and session creation
//! - route guards and the `CurrentUser` / `OptionalUser` extractors

mod handlers;
mod jwt;
mod middleware;
pub mod provider;
mod service;
pub mod types;

pub use handlers::{
    auth_callback, auth_login, auth_logout, auth_status, demo_login_get, demo_login_post,
};
pub use middleware::{
    build_auth_cookie, require_admin, require_api_auth, require_auth, CurrentUser, OptionalUser,
};
pub use provider::{GoogleProvider, IdentityProvider};
pub use service::{AuthService, LoginRedirect};
pub use types::{AuthConfig, AuthError, AuthMode, ProviderIdentity, SessionUser};
