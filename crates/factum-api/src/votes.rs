//! Handlers for `/facts/:slug/vote` — the vote aggregation surface.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/facts/:slug/vote` | Body: `{"rating":"helpful"}`; upsert |
//! | `GET`  | `/facts/:slug/vote` | The caller's own vote, or JSON null |
//! | `DELETE` | `/facts/:slug/vote` | Idempotent; 204 |
//!
//! The rating arrives as a string and is validated here — an unknown
//! category is a 400, not a silent coercion. The response to a cast
//! carries the tally computed after the write, so the caller always reads
//! their own vote in the counts.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};

use factum_core::{
  store::ContentStore,
  vote::{Rating, Vote, VoteCounts},
};

use crate::{AppState, auth::Identity, error::ApiError};

async fn fact_id_for<S>(
  state: &AppState<S>,
  slug:  &str,
) -> Result<i64, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .find_fact_id(slug)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::FactNotFound(slug.to_owned()))
}

// ─── Cast ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VoteBody {
  pub rating: String,
}

/// The caller's updated vote together with the post-write tally.
#[derive(Debug, Serialize)]
pub struct VoteResponse {
  #[serde(flatten)]
  pub vote:        Vote,
  #[serde(rename = "voteCounts")]
  pub vote_counts: VoteCounts,
}

/// `POST /facts/:slug/vote` — create on first vote, overwrite on revote.
pub async fn cast<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(slug): Path<String>,
  Json(body): Json<VoteBody>,
) -> Result<Json<VoteResponse>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // Validate before touching the store; invalid input never mutates.
  let rating = Rating::parse(&body.rating)
    .map_err(|_| ApiError::InvalidRating(body.rating.clone()))?;

  let fact_id = fact_id_for(&state, &slug).await?;

  let (vote, vote_counts) = state
    .store
    .cast_vote(fact_id, identity.user_id, rating)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(VoteResponse { vote, vote_counts }))
}

// ─── Get own ──────────────────────────────────────────────────────────────────

/// `GET /facts/:slug/vote` — the caller's vote; JSON `null` when they
/// have not voted.
pub async fn get_own<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(slug): Path<String>,
) -> Result<Json<Option<Vote>>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let fact_id = fact_id_for(&state, &slug).await?;

  let vote = state
    .store
    .get_vote(fact_id, identity.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(vote))
}

// ─── Delete own ───────────────────────────────────────────────────────────────

/// `DELETE /facts/:slug/vote` — removing a vote that does not exist is
/// not an error.
pub async fn delete_own<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(slug): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let fact_id = fact_id_for(&state, &slug).await?;

  state
    .store
    .delete_vote(fact_id, identity.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}
