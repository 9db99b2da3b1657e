//! Bearer-token authentication.
//!
//! Sessions are issued by the external auth service, which stores the
//! SHA-256 hex digest of each token. This module only resolves a token to
//! a user id.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::state::AppState;
use crate::store::{PgStore, StoreError};
use crate::utils::error::AppError;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the user behind `token`, or `None` for unknown or expired sessions.
    async fn authenticate(&self, token: &str) -> Result<Option<Uuid>, StoreError>;
}

pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[async_trait]
impl IdentityProvider for PgStore {
    async fn authenticate(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM sessions WHERE token_hash = $1 AND expires_at > NOW()",
        )
        .bind(hash_token(token))
        .fetch_optional(self.pool())
        .await?;

        Ok(user_id)
    }
}

/// The verified caller of a protected route.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("No token provided".to_string()))?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AppError::Unauthenticated(
            "Expected 'Bearer <token>'".to_string(),
        )),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts)?;

        let user_id = state
            .identity
            .authenticate(token)
            .await
            .map_err(|e| AppError::DependentServiceError(e.to_string()))?
            .ok_or_else(|| AppError::Unauthenticated("Invalid or expired token".to_string()))?;

        Ok(AuthUser { user_id })
    }
}
