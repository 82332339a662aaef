//! Allowlist checks, session creation and the login flows.

use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;
use shared_types::{normalize_email, User};

use super::jwt;
use super::middleware::{build_auth_cookie, clear_auth_cookie, extract_token_from_cookie};
use super::provider::IdentityProvider;
use super::types::{
    AuthConfig, AuthError, AuthMode, ProviderIdentity, SessionUser, SESSION_COOKIE, STATE_COOKIE,
};
use crate::services::AdminService;
use crate::storage::Storage;

/// A started provider login: where to send the browser and the state cookie to set.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    pub url: String,
    pub state_cookie: String,
}

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    provider: Option<Arc<dyn IdentityProvider>>,
    admin: AdminService,
    storage: Arc<dyn Storage>,
}

impl AuthService {
    /// `provider` is ignored in demo mode.
    pub fn new(
        config: AuthConfig,
        provider: Option<Arc<dyn IdentityProvider>>,
        admin: AdminService,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let provider = match config.mode {
            AuthMode::Provider => provider,
            AuthMode::Demo => None,
        };
        Self {
            config,
            provider,
            admin,
            storage,
        }
    }

    pub fn is_demo(&self) -> bool {
        self.config.is_demo()
    }

    pub fn generate_state_token(&self) -> String {
        jwt::generate_state_token()
    }

    /// Provider authorization URL, or `None` in demo mode.
    pub fn login_url(&self, state: &str) -> Option<String> {
        self.provider.as_ref().map(|p| p.authorization_url(state))
    }

    /// Starts a provider login with a fresh single-use state.
    pub fn begin_login(&self) -> Result<Option<LoginRedirect>, AuthError> {
        let state = self.generate_state_token();
        let Some(url) = self.login_url(&state) else {
            return Ok(None);
        };

        let token = jwt::create_state_token(&self.config, &state, Utc::now())
            .map_err(|e| AuthError::Session(e.into()))?;
        let state_cookie = build_auth_cookie(
            STATE_COOKIE,
            &token,
            self.config.state_duration_minutes * 60,
            self.config.secure_cookies,
        );

        Ok(Some(LoginRedirect { url, state_cookie }))
    }

    /// Checks the returned state against the state cookie.
    pub fn verify_state(&self, headers: &HeaderMap, returned: Option<&str>) -> Result<(), AuthError> {
        let expected = extract_token_from_cookie(headers, STATE_COOKIE)
            .and_then(|token| jwt::validate_state_token(&self.config, &token).ok());

        match (expected, returned) {
            (Some(expected), Some(returned)) if !returned.is_empty() && expected == returned => {
                Ok(())
            }
            (expected, returned) => {
                tracing::warn!(
                    "Invalid state parameter: expected present={}, got present={}",
                    expected.is_some(),
                    returned.is_some_and(|s| !s.is_empty())
                );
                Err(AuthError::InvalidState)
            }
        }
    }

    /// Exchanges an authorization code for the provider's identity.
    pub async fn handle_callback(&self, code: &str) -> Result<ProviderIdentity, AuthError> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            AuthError::Exchange(anyhow::anyhow!("No identity provider configured"))
        })?;

        let mut identity = provider
            .exchange_code(code)
            .await
            .map_err(AuthError::Exchange)?;
        identity.email = normalize_email(&identity.email);
        Ok(identity)
    }

    /// Dynamic allowlist, falling back to the startup seed if storage fails.
    pub async fn is_user_allowed(&self, email: &str) -> bool {
        match self.admin.get_config().await {
            Ok(config) => config.is_allowed(email),
            Err(e) => {
                tracing::warn!("Allowlist unavailable, using startup list: {}", e);
                self.admin.seed().is_allowed(email)
            }
        }
    }

    pub async fn is_user_admin(&self, email: &str) -> bool {
        match self.admin.get_config().await {
            Ok(config) => config.is_admin(email),
            Err(e) => {
                tracing::warn!("Admin list unavailable, using startup list: {}", e);
                self.admin.seed().is_admin(email)
            }
        }
    }

    /// Records the user and returns the `Set-Cookie` value for their session.
    ///
    /// The caller has already checked the allowlist.
    pub async fn create_session(&self, identity: &ProviderIdentity) -> Result<String, AuthError> {
        let now = Utc::now();
        let email = normalize_email(&identity.email);
        let is_admin = self.is_user_admin(&email).await;

        let joined_at = match self.storage.get_user(&email).await {
            Ok(Some(existing)) => existing.joined_at,
            Ok(None) => now,
            Err(e) => {
                tracing::warn!("Failed to load user {}: {}", email, e);
                now
            }
        };
        let user = User {
            email: email.clone(),
            name: identity.name.clone(),
            is_admin,
            joined_at,
        };
        if let Err(e) = self.storage.put_user(user).await {
            tracing::warn!("Failed to save user {}: {}", email, e);
        }

        let session = SessionUser {
            email,
            name: identity.name.clone(),
            picture: identity.picture.clone(),
            is_admin,
            login_time: now,
        };
        let token = jwt::create_session_token(&self.config, &session, now)
            .map_err(|e| AuthError::Session(e.into()))?;

        Ok(build_auth_cookie(
            SESSION_COOKIE,
            &token,
            self.config.session_duration_hours * 3600,
            self.config.secure_cookies,
        ))
    }

    /// `Set-Cookie` value that ends the session.
    pub fn clear_session(&self) -> String {
        clear_auth_cookie(SESSION_COOKIE, self.config.secure_cookies)
    }

    pub fn clear_state(&self) -> String {
        clear_auth_cookie(STATE_COOKIE, self.config.secure_cookies)
    }

    /// Signs in without a provider; only available in demo mode.
    pub async fn demo_login(&self, email: &str, name: Option<&str>) -> Result<String, AuthError> {
        if !self.is_demo() {
            return Err(AuthError::DemoUnavailable);
        }

        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AuthError::EmailRequired);
        }
        if !self.is_user_allowed(&email).await {
            tracing::warn!("Demo login rejected for {}", email);
            return Err(AuthError::NotAllowed(email));
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        let cookie = self
            .create_session(&ProviderIdentity {
                email: email.clone(),
                name,
                picture: None,
            })
            .await?;

        tracing::info!("Demo login for {}", email);
        Ok(cookie)
    }

    /// Decodes the session cookie, if present and valid.
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Option<SessionUser> {
        let token = extract_token_from_cookie(headers, SESSION_COOKIE)?;
        jwt::validate_session_token(&self.config, &token)
            .ok()
            .map(SessionUser::from)
    }
}
