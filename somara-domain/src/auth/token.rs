use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error};

use super::{AuthConfig, Claims};

/// Security errors for token operations
#[derive(Debug, Error, PartialEq)]
pub enum SecurityError {
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Invalid token audience")]
    InvalidAudience,

    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// The token is valid but carries no subject
    #[error("Token has no subject")]
    MissingSubject,

    #[error("Security configuration error: {0}")]
    ConfigError(String),
}

fn secret(config: &AuthConfig) -> Result<&[u8], SecurityError> {
    match config.jwt_secret.as_deref() {
        Some(secret) if !secret.is_empty() => Ok(secret.as_bytes()),
        _ => {
            error!("AUTH_JWT_SECRET is not configured; bearer tokens cannot be verified");
            Err(SecurityError::ConfigError("AUTH_JWT_SECRET is not configured".to_string()))
        }
    }
}

/// Verify an auth provider access token and return its claims
pub fn validate_token(token: &str, config: &AuthConfig) -> Result<Claims, SecurityError> {
    let key = DecodingKey::from_secret(secret(config)?);

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_audience(&[config.audience.as_str()]);
    if let Some(issuer) = &config.issuer {
        validation.set_issuer(&[issuer.as_str()]);
    }

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                SecurityError::InvalidToken
            }
            ErrorKind::InvalidAudience => SecurityError::InvalidAudience,
            ErrorKind::InvalidIssuer => SecurityError::InvalidIssuer,
            ErrorKind::InvalidSignature => SecurityError::TokenValidation("Invalid signature".to_string()),
            _ => SecurityError::TokenValidation(e.to_string()),
        }
    })?;

    if data.claims.sub.is_empty() {
        return Err(SecurityError::MissingSubject);
    }

    debug!("Validated token for user {}", data.claims.sub);
    Ok(data.claims)
}

/// Sign a token the way the auth provider does. Used by tests and local
/// tooling that need a valid bearer token.
pub fn generate_token(
    user_id: &str,
    email: Option<&str>,
    ttl: Duration,
    config: &AuthConfig,
) -> Result<String, SecurityError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        aud: config.audience.clone(),
        iss: config.issuer.clone(),
        email: email.map(str::to_string),
        role: Some("authenticated".to_string()),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret(config)?)).map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: Some("test_secret_key_for_testing_only".to_string()),
            audience: "authenticated".to_string(),
            issuer: Some("https://auth.somara.test".to_string()),
            bypass: false,
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = config();
        let token = generate_token("user-123", Some("a@b.c"), Duration::minutes(5), &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_expired_token() {
        let config = config();
        let token = generate_token("user-123", None, Duration::hours(-2), &config).unwrap();
        assert!(matches!(validate_token(&token, &config), Err(SecurityError::TokenExpired)));
    }

    #[test]
    fn test_audience_and_issuer_are_checked() {
        let config = config();
        let token = generate_token("user-123", None, Duration::minutes(5), &config).unwrap();

        let other_audience = AuthConfig {
            audience: "service_role".to_string(),
            ..config.clone()
        };
        assert!(matches!(
            validate_token(&token, &other_audience),
            Err(SecurityError::InvalidAudience)
        ));

        let other_issuer = AuthConfig {
            issuer: Some("https://elsewhere".to_string()),
            ..config
        };
        assert!(matches!(validate_token(&token, &other_issuer), Err(SecurityError::InvalidIssuer)));
    }

    #[test]
    fn test_wrong_secret_and_garbage() {
        let config = config();
        let token = generate_token("user-123", None, Duration::minutes(5), &config).unwrap();

        let other = AuthConfig {
            jwt_secret: Some("another-secret".to_string()),
            ..config.clone()
        };
        assert!(matches!(validate_token(&token, &other), Err(SecurityError::TokenValidation(_))));
        assert!(matches!(validate_token("invalid.token.format", &config), Err(SecurityError::InvalidToken)));
    }

    #[test]
    fn test_missing_secret_is_a_config_error() {
        let config = AuthConfig {
            jwt_secret: None,
            ..config()
        };
        assert!(matches!(validate_token("x", &config), Err(SecurityError::ConfigError(_))));
    }
}
