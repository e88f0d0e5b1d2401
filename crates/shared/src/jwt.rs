//! Session token utilities.
//!
//! Tokens are HS256 JWTs signed with a server-side secret. The subject is the
//! profile id; there is no refresh flow, a session simply lasts until `exp`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (profile ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique token identifier, used for log correlation
    pub jti: String,
}

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_in: i64,
}

/// Minimum secret length accepted for HS256 signing.
pub const MIN_SECRET_LEN: usize = 32;

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Signing configuration for session tokens.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Token lifetime in seconds
    pub token_expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("token_expiry_secs", &self.token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a config from a shared secret with the default leeway.
    pub fn new(secret: &str, token_expiry_secs: i64) -> Result<Self, JwtError> {
        Self::with_leeway(secret, token_expiry_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a config from a shared secret with custom clock-skew leeway.
    pub fn with_leeway(
        secret: &str,
        token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::InvalidKey(format!(
                "Secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if token_expiry_secs <= 0 {
            return Err(JwtError::InvalidKey(
                "Token expiry must be positive".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_secs,
            leeway_secs,
        })
    }

    /// Issues a session token for the given profile.
    pub fn issue(&self, profile_id: Uuid) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();
        let claims = Claims {
            sub: profile_id.to_string(),
            exp: (now + Duration::seconds(self.token_expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_in: self.token_expiry_secs,
        })
    }

    /// Validates a token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Extracts the profile ID from validated claims.
pub fn extract_profile_id(claims: &Claims) -> Result<Uuid, JwtError> {
    Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_jwt_testing_0123456789";

    fn config() -> JwtConfig {
        JwtConfig::with_leeway(SECRET, 3600, 0).unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let config = config();
        let profile_id = Uuid::new_v4();

        let issued = config.issue(profile_id).unwrap();
        let claims = config.validate(&issued.token).unwrap();

        assert_eq!(claims.sub, profile_id.to_string());
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(issued.expires_in, 3600);
        assert_eq!(extract_profile_id(&claims).unwrap(), profile_id);
    }

    #[test]
    fn test_claims_timestamps() {
        let config = config();
        let before = Utc::now().timestamp();
        let issued = config.issue(Uuid::new_v4()).unwrap();
        let after = Utc::now().timestamp();

        let claims = config.validate(&issued.token).unwrap();
        assert!(claims.iat >= before && claims.iat <= after);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = JwtConfig::new("too-short", 3600);
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let result = JwtConfig::new(SECRET, 0);
        assert!(matches!(result, Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let other = JwtConfig::new("another_secret_key_that_is_long_enough_!!", 3600).unwrap();
        let issued = other.issue(Uuid::new_v4()).unwrap();

        let result = config().validate(&issued.token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let config = config();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            exp: now - 120,
            iat: now - 240,
            jti: "expired".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = config.validate(&token);
        assert!(
            matches!(result, Err(JwtError::TokenExpired)),
            "Expected TokenExpired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_malformed_token() {
        assert!(config().validate("not_a_jwt").is_err());
    }

    #[test]
    fn test_non_uuid_subject() {
        let claims = Claims {
            sub: "admin".to_string(),
            exp: 0,
            iat: 0,
            jti: String::new(),
        };
        assert!(matches!(
            extract_profile_id(&claims),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_unique_jti_per_token() {
        let config = config();
        let profile_id = Uuid::new_v4();
        let a = config.issue(profile_id).unwrap();
        let b = config.issue(profile_id).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", config());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(SECRET));
    }
}
