//! Identity resolution — mapping a bearer credential to a user id.
//!
//! Two credential forms are accepted on the same `Authorization: Bearer`
//! header: a signed JWT issued by `/auth/login`, and an opaque API token
//! minted by `/generate-token`. JWT verification is tried first (it needs
//! no store round-trip); anything that fails it is looked up as an API
//! token. Every failure collapses to a single "unauthenticated" result.

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use factum_core::store::ContentStore;

use crate::{AppState, error::ApiError};

// ─── JWT ─────────────────────────────────────────────────────────────────────

/// Claims carried in the signed session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  /// The user id.
  pub sub:   i64,
  pub email: String,
  /// Expiry, seconds since the epoch. Validated on decode.
  pub exp:   i64,
}

/// Sign a session token for `user_id` valid for `ttl_hours`.
pub fn issue_jwt(
  user_id:   i64,
  email:     &str,
  secret:    &str,
  ttl_hours: i64,
) -> Result<String, ApiError> {
  let claims = Claims {
    sub:   user_id,
    email: email.to_owned(),
    exp:   (Utc::now() + Duration::hours(ttl_hours)).timestamp(),
  };
  jsonwebtoken::encode(
    &Header::default(),
    &claims,
    &EncodingKey::from_secret(secret.as_bytes()),
  )
  .map_err(|e| ApiError::Internal(format!("jwt signing failed: {e}")))
}

/// Verify a session token; `None` on any failure (bad signature, expired,
/// not a JWT at all).
pub fn verify_jwt(token: &str, secret: &str) -> Option<i64> {
  jsonwebtoken::decode::<Claims>(
    token,
    &DecodingKey::from_secret(secret.as_bytes()),
    &Validation::default(),
  )
  .ok()
  .map(|data| data.claims.sub)
}

// ─── Password hashing ────────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string for storage.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored PHC string. An unparsable hash
/// verifies as false rather than erroring.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Resolve the request's bearer credential to a user id, or `None` for an
/// anonymous request. Errors only on store failure.
pub async fn resolve_identity<S>(
  parts: &Parts,
  state: &AppState<S>,
) -> Result<Option<i64>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(header) = parts
    .headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
  else {
    return Ok(None);
  };

  let Some(token) = header.strip_prefix("Bearer ") else {
    return Ok(None);
  };

  if let Some(user_id) = verify_jwt(token, &state.config.jwt_secret) {
    return Ok(Some(user_id));
  }

  state
    .store
    .resolve_token(token)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// The resolved identity of an authenticated request. Rejects with 401
/// when no usable credential is present.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
  pub user_id: i64,
}

impl<S> FromRequestParts<AppState<S>> for Identity
where
  S: ContentStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    match resolve_identity(parts, state).await? {
      Some(user_id) => Ok(Identity { user_id }),
      None => Err(ApiError::Unauthenticated),
    }
  }
}

/// Identity for endpoints that serve anonymous requests too. Never
/// rejects on a missing or invalid credential — only on store failure.
#[derive(Debug, Clone, Copy)]
pub struct OptionalIdentity(pub Option<i64>);

impl<S> FromRequestParts<AppState<S>> for OptionalIdentity
where
  S: ContentStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    Ok(OptionalIdentity(resolve_identity(parts, state).await?))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &str = "test-secret";

  #[test]
  fn jwt_roundtrip() {
    let token = issue_jwt(42, "alice@example.com", SECRET, 24).unwrap();
    assert_eq!(verify_jwt(&token, SECRET), Some(42));
  }

  #[test]
  fn jwt_wrong_secret_rejected() {
    let token = issue_jwt(42, "alice@example.com", SECRET, 24).unwrap();
    assert_eq!(verify_jwt(&token, "other-secret"), None);
  }

  #[test]
  fn expired_jwt_rejected() {
    let token = issue_jwt(42, "alice@example.com", SECRET, -1).unwrap();
    assert_eq!(verify_jwt(&token, SECRET), None);
  }

  #[test]
  fn garbage_is_not_a_jwt() {
    assert_eq!(verify_jwt("deadbeef", SECRET), None);
    assert_eq!(verify_jwt("", SECRET), None);
  }

  #[test]
  fn password_hash_verifies() {
    let phc = hash_password("hunter2").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("hunter2", &phc));
    assert!(!verify_password("hunter3", &phc));
  }

  #[test]
  fn unparsable_hash_never_verifies() {
    assert!(!verify_password("hunter2", "not-a-phc-string"));
  }
}
