//! Handlers for `/posts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/posts` | The caller's own posts, any status |
//! | `GET`  | `/posts/public` | Published posts only |
//! | `POST` | `/posts` | Body: [`NewPostBody`]; returns 201 |
//! | `GET`  | `/posts/:slug` | Drafts visible to the owner only |
//! | `PUT`  | `/posts/:slug` | Owner only; non-owners see 404 |
//! | `DELETE` | `/posts/:slug` | Owner only; 204 |
//! | `POST` | `/posts/:slug/publish` | Owner only |
//!
//! Posts are exclusively owned. Every mutation takes the resolved
//! identity, and "not yours" is indistinguishable from "does not exist".

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use factum_core::{
  content::{NewPost, Post, PostPatch, PublishStatus},
  store::ContentStore,
};

use crate::{
  AppState,
  auth::{Identity, OptionalIdentity},
  error::ApiError,
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /posts` — all of the caller's posts, drafts included.
pub async fn list_own<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let posts = state
    .store
    .list_posts_for_author(identity.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(posts))
}

/// `GET /posts/public` — published posts, no auth.
pub async fn list_public<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let posts = state
    .store
    .list_public_posts()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(posts))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /posts/:slug` — published posts are public; a draft exists only
/// for its owner.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  OptionalIdentity(viewer): OptionalIdentity,
  Path(slug): Path<String>,
) -> Result<Json<Post>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let post = state
    .store
    .get_post(&slug)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::PostNotFound(slug.clone()))?;

  if post.status == PublishStatus::Draft && viewer != Some(post.author_id) {
    return Err(ApiError::PostNotFound(slug));
  }
  Ok(Json(post))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /posts`.
#[derive(Debug, Deserialize)]
pub struct NewPostBody {
  pub title:   String,
  pub content: String,
  /// Defaults to `draft`.
  pub status:  Option<PublishStatus>,
}

/// `POST /posts` — the author is the resolved identity, never a body
/// field.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Json(body): Json<NewPostBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("title must not be empty".into()));
  }

  let post = state
    .store
    .create_post(
      identity.user_id,
      NewPost {
        title:   body.title,
        content: body.content,
        status:  body.status,
      },
    )
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(post)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Partial patch for `PUT /posts/:slug`.
#[derive(Debug, Deserialize)]
pub struct PostPatchBody {
  pub title:   Option<String>,
  pub content: Option<String>,
  pub status:  Option<PublishStatus>,
}

/// `PUT /posts/:slug`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(slug): Path<String>,
  Json(body): Json<PostPatchBody>,
) -> Result<Json<Post>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let patch = PostPatch {
    title:   body.title,
    content: body.content,
    status:  body.status,
  };

  let post = state
    .store
    .update_post(&slug, identity.user_id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::PostNotFound(slug))?;
  Ok(Json(post))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /posts/:slug` — 204 on success.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(slug): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = state
    .store
    .delete_post(&slug, identity.user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if deleted {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::PostNotFound(slug))
  }
}

// ─── Publish ──────────────────────────────────────────────────────────────────

/// `POST /posts/:slug/publish` — status-only patch forcing `published`.
pub async fn publish<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(slug): Path<String>,
) -> Result<Json<Post>, ApiError>
where
  S: ContentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let patch =
    PostPatch { status: Some(PublishStatus::Published), ..Default::default() };

  let post = state
    .store
    .update_post(&slug, identity.user_id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::PostNotFound(slug))?;
  Ok(Json(post))
}
