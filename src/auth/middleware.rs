//! Authentication middleware
//!
//! Provides the Axum extractor that gates protected routes: it pulls the
//! bearer token from the Authorization header, verifies it as an access
//! token, and hands the decoded identity to the handler.
//!
//! Verification is purely cryptographic — no ledger lookup. An access
//! token stays valid until its natural expiry; revocation applies only to
//! refresh tokens.

use crate::auth::jwt::TokenError;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

/// Authenticated user extracted from a verified access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::MissingCredential)?;

        // Check Bearer scheme
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::MissingCredential)?;

        // Expired gets its own code so the client knows to refresh;
        // anything else means re-login.
        let claims = app_state
            .jwt()
            .verify_access(token)
            .map_err(|e| match e {
                TokenError::Expired => ApiError::CredentialExpired,
                TokenError::Malformed | TokenError::SignatureInvalid => ApiError::CredentialInvalid,
            })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::CredentialInvalid)?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_user_debug() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
        };
        let debug_str = format!("{:?}", user);
        assert!(debug_str.contains("AuthUser"));
    }
}
