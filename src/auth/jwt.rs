//! JWT token generation and validation
//!
//! Provides access and refresh token management with pre-computed keys
//! for optimal performance.
//!
//! Access and refresh tokens are signed with separate secrets and carry
//! separate claim schemas, so a token minted for one purpose can never be
//! presented as the other. Verification is deterministic and stateless:
//! validity is decided entirely by signature and expiry.

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email of the subject
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Refresh token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Why a token failed verification
///
/// The gate maps `Expired` to a distinct response code so clients know to
/// run the refresh flow; `Malformed` and `SignatureInvalid` both mean the
/// token is unusable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    SignatureInvalid,
    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            _ => TokenError::Malformed,
        }
    }
}

/// Pre-computed key pair for one token purpose
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// Token lifetimes in seconds, per purpose
#[derive(Clone)]
pub struct TokenLifetimes {
    pub access_secs: i64,
    pub refresh_secs: i64,
}

/// JWT service for token operations
///
/// Design: one pre-computed key pair per purpose, wrapped in Arc for
/// cheap cloning. Construct once at startup and store in AppState.
#[derive(Clone)]
pub struct JwtService {
    access_keys: JwtKeys,
    refresh_keys: JwtKeys,
    lifetimes: TokenLifetimes,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys for both purposes
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
    ) -> Self {
        Self {
            access_keys: JwtKeys::new(access_secret),
            refresh_keys: JwtKeys::new(refresh_secret),
            lifetimes: TokenLifetimes {
                access_secs: access_token_expiry_secs,
                refresh_secs: refresh_token_expiry_secs,
            },
        }
    }

    /// Sign an access token for a user
    pub fn sign_access(&self, user_id: Uuid, email: &str) -> Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.lifetimes.access_secs)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.access_keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign access token: {}", e))
    }

    /// Sign a refresh token for a user
    pub fn sign_refresh(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.lifetimes.refresh_secs)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.refresh_keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign refresh token: {}", e))
    }

    /// Verify an access token and return its claims
    #[inline]
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        Self::verify(token, &self.access_keys.decoding)
    }

    /// Verify a refresh token and return its claims
    #[inline]
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        Self::verify(token, &self.refresh_keys.decoding)
    }

    fn verify<T: DeserializeOwned>(token: &str, key: &DecodingKey) -> Result<T, TokenError> {
        let mut validation = Validation::default();
        // No leeway: expiry is exact
        validation.leeway = 0;
        decode::<T>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::from)
    }

    /// Get access token lifetime in seconds
    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.lifetimes.access_secs
    }

    /// Get refresh token lifetime in seconds
    #[inline]
    pub fn refresh_token_expiry_secs(&self) -> i64 {
        self.lifetimes.refresh_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test-access-secret", "test-refresh-secret", 900, 604800)
    }

    #[test]
    fn test_sign_and_verify_access_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.sign_access(user_id, "user@example.com").unwrap();
        let claims = service.verify_access(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "user@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_sign_and_verify_refresh_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.sign_refresh(user_id).unwrap();
        let claims = service.verify_refresh(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.sign_access(user_id, "user@example.com").unwrap();
        let result = service.verify_refresh(&token);

        assert_eq!(result.unwrap_err(), TokenError::SignatureInvalid);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.sign_refresh(user_id).unwrap();
        let result = service.verify_access(&token);

        assert_eq!(result.unwrap_err(), TokenError::SignatureInvalid);
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let service = create_test_service();
        assert_eq!(
            service.verify_access("not.a.token").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(
            service.verify_access("").unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_foreign_signature_is_invalid() {
        let service = create_test_service();
        let other = JwtService::new("other-access-secret", "other-refresh-secret", 900, 604800);
        let user_id = Uuid::new_v4();

        let token = other.sign_access(user_id, "user@example.com").unwrap();
        let result = service.verify_access(&token);

        assert_eq!(result.unwrap_err(), TokenError::SignatureInvalid);
    }

    #[test]
    fn test_expired_token_is_expired() {
        // Negative lifetime puts exp in the past at signing time
        let service = JwtService::new("test-access-secret", "test-refresh-secret", -60, -60);
        let user_id = Uuid::new_v4();

        let access = service.sign_access(user_id, "user@example.com").unwrap();
        assert_eq!(
            service.verify_access(&access).unwrap_err(),
            TokenError::Expired
        );

        let refresh = service.sign_refresh(user_id).unwrap();
        assert_eq!(
            service.verify_refresh(&refresh).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_service_is_clone_cheap() {
        let service = create_test_service();
        let _cloned = service.clone(); // Should be cheap due to Arc
    }
}
