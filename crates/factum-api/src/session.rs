//! Handlers for `/auth` endpoints — registration and login.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: [`RegisterBody`]; returns 201 + user |
//! | `POST` | `/auth/login` | Body: [`LoginBody`]; returns signed token |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use factum_core::{store::ContentStore, user::NewUser};

use crate::{
  AppState,
  auth::{hash_password, issue_jwt, verify_password},
  error::ApiError,
};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub email:        String,
  pub password:     String,
  pub display_name: Option<String>,
}

/// `POST /auth/register` — 201 + the created user, 409 if the email is
/// already registered.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.email.trim().is_empty() {
    return Err(ApiError::BadRequest("email must not be empty".into()));
  }
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password must not be empty".into()));
  }

  let input = NewUser {
    email:         body.email.clone(),
    password_hash: Some(hash_password(&body.password)?),
    display_name:  body.display_name,
  };

  let user = state
    .store
    .create_user(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::EmailTaken(body.email))?;

  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token:   String,
  pub user_id: i64,
  pub email:   String,
}

/// `POST /auth/login` — verify credentials and issue a signed session
/// token. Unknown email and wrong password are indistinguishable (401).
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let creds = state
    .store
    .find_credentials(&body.email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::InvalidCredentials)?;

  // Accounts provisioned by an external identity provider have no local
  // password and cannot log in here.
  let phc = creds
    .password_hash
    .as_deref()
    .ok_or(ApiError::InvalidCredentials)?;

  if !verify_password(&body.password, phc) {
    return Err(ApiError::InvalidCredentials);
  }

  let token = issue_jwt(
    creds.user.id,
    &creds.user.email,
    &state.config.jwt_secret,
    state.config.token_ttl_hours,
  )?;

  Ok(Json(LoginResponse {
    token,
    user_id: creds.user.id,
    email: creds.user.email,
  }))
}
