//! The `ContentStore` trait — the persistence seam of the platform.
//!
//! Implemented by storage backends (e.g. `factum-store-sqlite`). The API
//! layer depends on this abstraction, not on any concrete backend.
//!
//! Two conventions keep the handlers backend-agnostic:
//! - "missing" outcomes (entity not found, email taken, not owned) are
//!   expressed in the return type (`Option` / `bool`), so handlers can map
//!   them to 404/409 without inspecting the backend's error type;
//! - `Self::Error` is reserved for genuine storage failures, which the API
//!   surfaces as 500.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  content::{Fact, FactPatch, FactWithVotes, NewFact, NewPost, Post, PostPatch},
  token::ApiToken,
  user::{NewUser, User, UserCredentials},
  vote::{Rating, Vote, VoteCounts},
};

/// Abstraction over a Factum storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (tokio with axum).
pub trait ContentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user. Returns `None` if the email is already registered
  /// (unique-index conflict).
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Retrieve a user by id.
  fn get_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user by email together with their password hash, for
  /// login verification.
  fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send + 'a;

  // ── Facts ─────────────────────────────────────────────────────────────

  /// All facts newest-first, each enriched with the viewer's own votes
  /// (empty when `viewer` is `None`) and the global tally. With
  /// `public_only`, drafts are excluded.
  fn list_facts(
    &self,
    viewer: Option<i64>,
    public_only: bool,
  ) -> impl Future<Output = Result<Vec<FactWithVotes>, Self::Error>> + Send + '_;

  /// A single fact by slug, enriched as in [`Self::list_facts`].
  fn get_fact<'a>(
    &'a self,
    slug: &'a str,
    viewer: Option<i64>,
  ) -> impl Future<Output = Result<Option<FactWithVotes>, Self::Error>> + Send + 'a;

  /// Resolve a slug to the fact's numeric id without the vote enrichment.
  fn find_fact_id<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + 'a;

  /// Create a fact; the slug is derived from the claim and disambiguated
  /// against the unique index. Status defaults to draft.
  fn create_fact(
    &self,
    input: NewFact,
  ) -> impl Future<Output = Result<Fact, Self::Error>> + Send + '_;

  /// Partial update. The slug is regenerated iff the patch contains a
  /// claim that differs from the stored one. `None` if the slug is
  /// unknown.
  fn update_fact<'a>(
    &'a self,
    slug: &'a str,
    patch: FactPatch,
  ) -> impl Future<Output = Result<Option<Fact>, Self::Error>> + Send + 'a;

  /// Hard delete; the fact's votes go with it. `false` if the slug is
  /// unknown.
  fn delete_fact<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// All of one author's posts, any status, newest-first.
  fn list_posts_for_author(
    &self,
    author_id: i64,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// Published posts only, newest-first.
  fn list_public_posts(
    &self,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// A single post by slug, regardless of status or ownership; visibility
  /// filtering is the caller's concern.
  fn get_post<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + 'a;

  /// Create a post owned by `author_id`; slug derived from the title.
  fn create_post(
    &self,
    author_id: i64,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  /// Partial update with ownership check: `None` when the post is missing
  /// *or* owned by someone else, so callers cannot distinguish the two.
  fn update_post<'a>(
    &'a self,
    slug: &'a str,
    author_id: i64,
    patch: PostPatch,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + 'a;

  /// Hard delete with the same ownership semantics as
  /// [`Self::update_post`].
  fn delete_post<'a>(
    &'a self,
    slug: &'a str,
    author_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Upsert the user's vote on a fact — create on first vote, overwrite
  /// the rating on revote — and return the vote together with the tally
  /// computed after the write (read-your-write).
  ///
  /// The upsert must be a single atomic statement backed by the
  /// `UNIQUE (fact_id, user_id)` constraint; concurrent votes from
  /// different users must both land.
  fn cast_vote(
    &self,
    fact_id: i64,
    user_id: i64,
    rating: Rating,
  ) -> impl Future<Output = Result<(Vote, VoteCounts), Self::Error>> + Send + '_;

  /// The user's vote on a fact, if any.
  fn get_vote(
    &self,
    fact_id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<Vote>, Self::Error>> + Send + '_;

  /// Remove the user's vote. Idempotent — returns `false` when there was
  /// nothing to remove, which is not an error.
  fn delete_vote(
    &self,
    fact_id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The per-category tally for a fact.
  fn vote_counts(
    &self,
    fact_id: i64,
  ) -> impl Future<Output = Result<VoteCounts, Self::Error>> + Send + '_;

  // ── API tokens ────────────────────────────────────────────────────────

  /// Mint a new token for the user. The returned record carries the full
  /// secret; this is the only time it is ever readable.
  fn issue_token(
    &self,
    user_id: i64,
    name: Option<String>,
    expires_at: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<ApiToken, Self::Error>> + Send + '_;

  /// The user's currently-usable tokens (not revoked, not expired),
  /// newest-first. Secrets are included; mask before serialising.
  fn list_tokens(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<ApiToken>, Self::Error>> + Send + '_;

  /// Soft-revoke a token (`is_revoked = true`, row kept for audit).
  /// `false` when the token is missing or owned by someone else.
  fn revoke_token(
    &self,
    token_id: i64,
    user_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Resolve a bearer token string to its owning user id, if the token is
  /// usable right now. Stamps `last_used` on success.
  fn resolve_token<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + 'a;
}
