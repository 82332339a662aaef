//! Auth-related types and configuration.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;

// Re-export shared types for convenience
pub use shared_types::{AuthStatusResponse, AuthUserResponse, DemoLoginRequest};

pub const SESSION_COOKIE: &str = "watered_session";
pub const STATE_COOKIE: &str = "watered_oauth_state";

/// How users sign in, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Real OAuth2 provider credentials are configured.
    Provider,
    /// No credentials; the demo login path is open.
    Demo,
}

/// Session JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user email)
    pub sub: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub is_admin: bool,
    /// Unix timestamp of the login that created the session
    pub login_time: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Claims of the short-lived OAuth2 state cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateClaims {
    pub state: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signed-in user decoded from the session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub is_admin: bool,
    pub login_time: DateTime<Utc>,
}

impl From<SessionClaims> for SessionUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            login_time: Utc
                .timestamp_opt(claims.login_time, 0)
                .single()
                .unwrap_or_else(Utc::now),
            email: claims.sub,
            name: claims.name,
            picture: claims.picture,
            is_admin: claims.is_admin,
        }
    }
}

impl From<&SessionUser> for AuthUserResponse {
    fn from(user: &SessionUser) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Identity returned by the provider after a successful code exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Auth configuration derived from [`AppConfig`]
#[derive(Clone)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub session_secret: String,
    pub secure_cookies: bool,
    pub session_duration_hours: i64,
    pub state_duration_minutes: i64,
}

impl AuthConfig {
    pub fn new(mode: AuthMode, session_secret: impl Into<String>, secure_cookies: bool) -> Self {
        Self {
            mode,
            session_secret: session_secret.into(),
            secure_cookies,
            session_duration_hours: 24,
            state_duration_minutes: 10,
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            config.auth_mode(),
            config.session_secret.clone(),
            config.secure_cookies,
        )
    }

    pub fn is_demo(&self) -> bool {
        self.mode == AuthMode::Demo
    }
}

/// Failures of the login flows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Demo login not available")]
    DemoUnavailable,

    #[error("Email is required")]
    EmailRequired,

    #[error("Authorization code not found")]
    MissingCode,

    #[error("Invalid state parameter")]
    InvalidState,

    #[error("Access denied: User not authorized")]
    NotAllowed(String),

    #[error("Authentication failed")]
    Exchange(#[source] anyhow::Error),

    #[error("Failed to create session")]
    Session(#[source] anyhow::Error),
}
