//! Handlers for `/facts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/facts` | Auth optional; rows carry voteCounts + caller's votes |
//! | `GET`  | `/facts/public` | Published facts only |
//! | `POST` | `/facts` | Body: [`NewFactBody`]; returns 201 + stored fact |
//! | `GET`  | `/facts/:slug` | Single fact with votes |
//! | `PUT`  | `/facts/:slug` | Partial patch; slug follows claim changes |
//! | `DELETE` | `/facts/:slug` | 204; votes cascade |
//! | `POST` | `/facts/:slug/publish` | Force `status = published` |
//!
//! Facts carry no owner — mutation requires authentication, nothing more.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use factum_core::{
  content::{Fact, FactPatch, FactWithVotes, NewFact, PublishStatus},
  store::ContentStore,
};

use crate::{
  AppState,
  auth::{Identity, OptionalIdentity},
  error::ApiError,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /facts` — newest-first; the `votes` array holds only the caller's
/// own votes (empty for anonymous requests).
pub async fn list<S>(
  State(state): State<AppState<S>>,
  OptionalIdentity(viewer): OptionalIdentity,
) -> Result<Json<Vec<FactWithVotes>>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let facts = state
    .store
    .list_facts(viewer, false)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(facts))
}

/// `GET /facts/public` — published facts only, no auth.
pub async fn list_public<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<FactWithVotes>>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let facts = state
    .store
    .list_facts(None, true)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(facts))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /facts/:slug`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  OptionalIdentity(viewer): OptionalIdentity,
  Path(slug): Path<String>,
) -> Result<Json<FactWithVotes>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let fact = state
    .store
    .get_fact(&slug, viewer)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::FactNotFound(slug))?;
  Ok(Json(fact))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /facts`.
#[derive(Debug, Deserialize)]
pub struct NewFactBody {
  pub claim:  String,
  pub answer: String,
  /// Defaults to `draft`.
  pub status: Option<PublishStatus>,
}

/// `POST /facts` — returns 201 + the stored fact with its derived slug.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _identity: Identity,
  Json(body): Json<NewFactBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.claim.trim().is_empty() {
    return Err(ApiError::BadRequest("claim must not be empty".into()));
  }

  let fact = state
    .store
    .create_fact(NewFact {
      claim:  body.claim,
      answer: body.answer,
      status: body.status,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(fact)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Partial patch for `PUT /facts/:slug`. Omitted fields keep their stored
/// values.
#[derive(Debug, Deserialize)]
pub struct FactPatchBody {
  pub claim:  Option<String>,
  pub answer: Option<String>,
  pub status: Option<PublishStatus>,
}

/// `PUT /facts/:slug`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _identity: Identity,
  Path(slug): Path<String>,
  Json(body): Json<FactPatchBody>,
) -> Result<Json<Fact>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let patch = FactPatch {
    claim:  body.claim,
    answer: body.answer,
    status: body.status,
  };

  let fact = state
    .store
    .update_fact(&slug, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::FactNotFound(slug))?;
  Ok(Json(fact))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /facts/:slug` — 204 on success.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  _identity: Identity,
  Path(slug): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = state
    .store
    .delete_fact(&slug)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if deleted {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::FactNotFound(slug))
  }
}

// ─── Publish ──────────────────────────────────────────────────────────────────

/// `POST /facts/:slug/publish` — status-only patch forcing `published`.
pub async fn publish<S>(
  State(state): State<AppState<S>>,
  _identity: Identity,
  Path(slug): Path<String>,
) -> Result<Json<Fact>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let patch =
    FactPatch { status: Some(PublishStatus::Published), ..Default::default() };

  let fact = state
    .store
    .update_fact(&slug, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::FactNotFound(slug))?;
  Ok(Json(fact))
}
