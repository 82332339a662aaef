use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::auth::AuthMode;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REDIRECT_URL: &str = "http://localhost:8080/auth/callback";
const DEV_SESSION_SECRET: &str = "watered-development-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: String,
    pub secure_cookies: bool,
    pub session_secret: String,
    /// False when the development secret is in use.
    pub session_secret_from_env: bool,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub redirect_url: String,
    pub allowed_emails: Vec<String>,
    pub admin_emails: Vec<String>,
    pub storage_path: Option<PathBuf>,
    pub frontend_dir: String,
    pub cors_allowed_origins: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(port) => port.parse().context("PORT must be a valid number")?,
            None => DEFAULT_PORT,
        };

        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let secure_cookies = is_production_name(&environment)
            || var("SECURE_COOKIES").is_some_and(|v| v.eq_ignore_ascii_case("true"));

        let (session_secret, session_secret_from_env) = match var("SESSION_SECRET") {
            Some(secret) => (secret, true),
            None => (DEV_SESSION_SECRET.to_string(), false),
        };

        Ok(Self {
            port,
            environment,
            secure_cookies,
            session_secret,
            session_secret_from_env,
            google_client_id: var("GOOGLE_CLIENT_ID"),
            google_client_secret: var("GOOGLE_CLIENT_SECRET"),
            redirect_url: var("REDIRECT_URL").unwrap_or_else(|| DEFAULT_REDIRECT_URL.to_string()),
            allowed_emails: parse_email_list(var("ALLOWED_EMAILS").as_deref()),
            admin_emails: parse_email_list(var("ADMIN_EMAILS").as_deref()),
            storage_path: var("STORAGE_PATH").map(PathBuf::from),
            frontend_dir: var("FRONTEND_DIR").unwrap_or_else(|| "web".to_string()),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS"),
        })
    }

    /// Provider login needs both client credentials; anything less is demo mode.
    pub fn auth_mode(&self) -> AuthMode {
        if self.google_client_id.is_some() && self.google_client_secret.is_some() {
            AuthMode::Provider
        } else {
            AuthMode::Demo
        }
    }

    /// `production` or its `prod` alias, in any case.
    pub fn is_production(&self) -> bool {
        is_production_name(&self.environment)
    }

    /// Logs the effective configuration without secrets.
    pub fn log_summary(&self) {
        tracing::info!("Environment: {}", self.environment);
        tracing::info!("Auth mode: {:?}", self.auth_mode());
        if self.session_secret_from_env {
            tracing::info!("Session secret loaded from SESSION_SECRET");
        } else if self.is_production() {
            tracing::error!(
                "SESSION_SECRET not set in production, sessions use the development secret"
            );
        } else {
            tracing::warn!("SESSION_SECRET not set, using development secret");
        }
        if self.allowed_emails.is_empty() && self.admin_emails.is_empty() {
            tracing::info!("No ALLOWED_EMAILS or ADMIN_EMAILS set, seeding demo accounts");
        } else {
            tracing::info!(
                "Allowlist seed: {} allowed, {} admin emails",
                self.allowed_emails.len(),
                self.admin_emails.len()
            );
        }
        match &self.storage_path {
            Some(path) => tracing::info!("Storage: JSON file at {}", path.display()),
            None => tracing::info!("Storage: in-memory"),
        }
        tracing::info!("Secure cookies: {}", self.secure_cookies);
    }
}

fn is_production_name(environment: &str) -> bool {
    environment.eq_ignore_ascii_case("production") || environment.eq_ignore_ascii_case("prod")
}

/// Splits a comma-separated list into trimmed, lower-cased emails.
pub fn parse_email_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
