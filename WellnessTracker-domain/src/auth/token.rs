use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::{AuthConfig, Claims};

/// Security errors for token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Invalid token issuer")]
    InvalidIssuer,

    #[error("Security configuration error: {0}")]
    ConfigError(String),
}

/// Profile details carried in a generated token
#[derive(Debug, Clone, Default)]
pub struct TokenProfile {
    pub roles: Vec<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

/// Generate a signed HS256 token. Used by tests and tooling; the service
/// itself only consumes tokens.
pub fn generate_token(
    config: &AuthConfig,
    user_id: &str,
    profile: TokenProfile,
    lifetime: Duration,
) -> Result<String, SecurityError> {
    if config.secret.is_empty() {
        return Err(SecurityError::ConfigError("JWT secret is empty".to_string()));
    }

    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iss: config.issuer.clone(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
        roles: profile.roles,
        given_name: profile.given_name,
        family_name: profile.family_name,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })
}

/// Validate a JWT and return its claims
pub fn validate_token(config: &AuthConfig, token: &str) -> Result<Claims, SecurityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_issuer(&[config.issuer.as_str()]);
    validation.set_required_spec_claims(&["sub", "iss", "iat", "exp"]);

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(config.secret.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => SecurityError::InvalidIssuer,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                SecurityError::TokenValidation("Invalid signature".to_string())
            }
            _ => SecurityError::TokenValidation(e.to_string()),
        })?;

    debug!("Validated token for user {}", token_data.claims.sub);
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new("test_secret_key_for_testing_only", "test-issuer")
    }

    #[test]
    fn test_generate_and_validate_token() {
        let profile = TokenProfile {
            roles: vec!["patient".to_string()],
            given_name: Some("Ada".to_string()),
            family_name: None,
        };
        let token = generate_token(&config(), "test-user-123", profile, Duration::minutes(15)).unwrap();
        assert!(!token.is_empty());

        let claims = validate_token(&config(), &token).unwrap();
        assert_eq!(claims.sub, "test-user-123");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.roles, vec!["patient".to_string()]);
        assert_eq!(claims.given_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_token_expiration() {
        let token = generate_token(&config(), "test-user-456", TokenProfile::default(), Duration::hours(-1)).unwrap();

        match validate_token(&config(), &token) {
            Err(SecurityError::TokenExpired) => {}
            other => panic!("Expected TokenExpired error but got: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_issuer_and_secret() {
        let token = generate_token(&config(), "u", TokenProfile::default(), Duration::minutes(5)).unwrap();

        let other_issuer = AuthConfig::new("test_secret_key_for_testing_only", "someone-else");
        assert!(matches!(validate_token(&other_issuer, &token), Err(SecurityError::InvalidIssuer)));

        let other_secret = AuthConfig::new("a-different-secret", "test-issuer");
        assert!(validate_token(&other_secret, &token).is_err());
    }

    #[test]
    fn test_invalid_token() {
        match validate_token(&config(), "invalid.token.format") {
            Err(SecurityError::InvalidToken) | Err(SecurityError::TokenValidation(_)) => {}
            other => panic!("Expected InvalidToken or TokenValidation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_secret_rejected() {
        let empty = AuthConfig::new("", "test-issuer");
        assert!(matches!(
            generate_token(&empty, "u", TokenProfile::default(), Duration::minutes(5)),
            Err(SecurityError::ConfigError(_))
        ));
    }
}
