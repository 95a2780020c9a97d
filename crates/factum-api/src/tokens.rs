//! Handlers for API-token management.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/generate-token` | Mints a token; the only response that carries the full secret |
//! | `GET`  | `/tokens` | The caller's usable tokens, secrets masked |
//! | `DELETE` | `/tokens/:id` | Soft revoke; 204 |
//!
//! A revoked token stays in storage with `is_revoked` set, so revocation
//! never disturbs the audit trail.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use factum_core::{store::ContentStore, token::ApiToken};

use crate::{AppState, auth::Identity, error::ApiError};

// ─── Generate ─────────────────────────────────────────────────────────────────

/// Optional JSON body for `POST /generate-token`.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  /// Human-readable label shown in listings.
  pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
  pub id:         i64,
  /// The full secret. Shown once; listings only ever return the masked
  /// form.
  pub token:      String,
  pub name:       Option<String>,
  pub expires_at: Option<DateTime<Utc>>,
}

/// `POST /generate-token` — mint a fresh API token for the caller.
pub async fn generate<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  body: Option<Json<GenerateBody>>,
) -> Result<Json<GenerateResponse>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let name = body.and_then(|Json(b)| b.name);
  let expires_at = Utc::now() + Duration::days(state.config.api_token_ttl_days);

  let token = state
    .store
    .issue_token(identity.user_id, name, Some(expires_at))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(GenerateResponse {
    id:         token.id,
    token:      token.token,
    name:       token.name,
    expires_at: token.expires_at,
  }))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// One row of `GET /tokens`. The `token` field is masked.
#[derive(Debug, Serialize)]
pub struct MaskedToken {
  pub id:         i64,
  pub token:      String,
  pub name:       Option<String>,
  pub created_at: DateTime<Utc>,
  pub expires_at: Option<DateTime<Utc>>,
  pub last_used:  Option<DateTime<Utc>>,
}

impl From<ApiToken> for MaskedToken {
  fn from(t: ApiToken) -> Self {
    let token = t.masked();
    MaskedToken {
      id: t.id,
      token,
      name: t.name,
      created_at: t.created_at,
      expires_at: t.expires_at,
      last_used: t.last_used,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct TokenList {
  pub tokens: Vec<MaskedToken>,
}

/// `GET /tokens` — the caller's usable tokens; revoked and expired ones
/// are omitted.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
) -> Result<Json<TokenList>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let tokens = state
    .store
    .list_tokens(identity.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .into_iter()
    .map(MaskedToken::from)
    .collect();

  Ok(Json(TokenList { tokens }))
}

// ─── Revoke ───────────────────────────────────────────────────────────────────

/// `DELETE /tokens/:id` — soft revoke. A token belonging to someone else
/// looks like a missing one.
pub async fn revoke<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let revoked = state
    .store
    .revoke_token(id, identity.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if revoked {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::TokenNotFound(id))
  }
}
