//! Signing and validation of the session and OAuth2 state cookies.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use super::types::{AuthConfig, SessionClaims, SessionUser, StateClaims};

/// Create a session token for a signed-in user.
pub fn create_session_token(
    config: &AuthConfig,
    user: &SessionUser,
    now: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = now + Duration::hours(config.session_duration_hours);

    let claims = SessionClaims {
        sub: user.email.clone(),
        name: user.name.clone(),
        picture: user.picture.clone(),
        is_admin: user.is_admin,
        login_time: user.login_time.timestamp(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
}

/// Validate a session token and return its claims.
pub fn validate_session_token(
    config: &AuthConfig,
    token: &str,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.session_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Wrap an OAuth2 state value in a short-lived signed token.
pub fn create_state_token(
    config: &AuthConfig,
    state: &str,
    now: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = StateClaims {
        state: state.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(config.state_duration_minutes)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
}

/// Returns the state value carried by a valid, unexpired token.
pub fn validate_state_token(
    config: &AuthConfig,
    token: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let token_data = decode::<StateClaims>(
        token,
        &DecodingKey::from_secret(config.session_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims.state)
}

/// 32 random bytes, base64url encoded.
pub fn generate_state_token() -> String {
    let mut bytes = [0u8; 32];
    bytes[..16].copy_from_slice(uuid::Uuid::new_v4().as_bytes());
    bytes[16..].copy_from_slice(uuid::Uuid::new_v4().as_bytes());
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthMode;

    fn test_config() -> AuthConfig {
        AuthConfig::new(AuthMode::Demo, "test-secret-key-for-testing-only", false)
    }

    fn test_user() -> SessionUser {
        SessionUser {
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            picture: Some("https://example.com/me.png".to_string()),
            is_admin: true,
            login_time: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_create_and_validate_session_token() {
        let config = test_config();
        let token =
            create_session_token(&config, &test_user(), Utc::now()).expect("should create token");

        let claims = validate_session_token(&config, &token).expect("should validate token");
        assert_eq!(claims.sub, "test@example.com");
        assert_eq!(claims.name, "Test User");
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(SessionUser::from(claims), test_user());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let config = test_config();
        assert!(validate_session_token(&config, "invalid-token").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = test_config();
        let token = create_session_token(&config, &test_user(), Utc::now()).unwrap();

        let mut wrong_config = config;
        wrong_config.session_secret = "wrong-secret".to_string();

        assert!(validate_session_token(&wrong_config, &token).is_err());
    }

    #[test]
    fn test_expired_session_rejected() {
        let config = test_config();
        let token =
            create_session_token(&config, &test_user(), Utc::now() - Duration::hours(25)).unwrap();
        assert!(validate_session_token(&config, &token).is_err());
    }

    #[test]
    fn test_state_token_round_trip_and_expiry() {
        let config = test_config();
        let token = create_state_token(&config, "abc", Utc::now()).unwrap();
        assert_eq!(validate_state_token(&config, &token).unwrap(), "abc");

        let stale = create_state_token(&config, "abc", Utc::now() - Duration::minutes(15)).unwrap();
        assert!(validate_state_token(&config, &stale).is_err());
    }

    #[test]
    fn test_state_token_is_not_a_session() {
        let config = test_config();
        let token = create_state_token(&config, "abc", Utc::now()).unwrap();
        assert!(validate_session_token(&config, &token).is_err());
    }

    #[test]
    fn test_generated_state_tokens_are_unique() {
        let a = generate_state_token();
        let b = generate_state_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
