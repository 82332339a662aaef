use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bounds on the watering interval an admin may configure (one week).
pub const MIN_ADMIN_TIMEOUT_HOURS: i64 = 1;
pub const MAX_ADMIN_TIMEOUT_HOURS: i64 = 168;

/// An authenticated identity, upserted on every login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
}

/// System-wide settings editable from the admin surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    pub timeout_hours: i64,
    pub allowed_emails: Vec<String>,
    pub admin_emails: Vec<String>,
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_by: String,
}

impl AdminConfig {
    /// Builds a config from seed lists. Admins are always appended to the
    /// allowed list if missing; duplicates are dropped.
    pub fn seeded(timeout_hours: i64, allowed: &[String], admins: &[String]) -> Self {
        let mut allowed_emails: Vec<String> = Vec::new();
        for email in allowed.iter().chain(admins) {
            let email = normalize_email(email);
            if !email.is_empty() && !allowed_emails.contains(&email) {
                allowed_emails.push(email);
            }
        }

        let mut admin_emails: Vec<String> = Vec::new();
        for email in admins {
            let email = normalize_email(email);
            if !email.is_empty() && !admin_emails.contains(&email) {
                admin_emails.push(email);
            }
        }

        AdminConfig {
            timeout_hours,
            allowed_emails,
            admin_emails,
            last_modified: None,
            modified_by: String::new(),
        }
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.allowed_emails.iter().any(|e| *e == email)
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.admin_emails.iter().any(|e| *e == email)
    }

    pub fn touch(&mut self, actor: &str, now: DateTime<Utc>) {
        self.last_modified = Some(now);
        self.modified_by = actor.to_string();
    }
}

/// Trimmed, lower-cased form used for every allowlist comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check: something with an `@` and a `.`.
pub fn is_plausible_email(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}
