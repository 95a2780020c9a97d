//! JSON REST API for Factum.
//!
//! Exposes an axum [`Router`] backed by any
//! [`factum_core::store::ContentStore`]. The server binary lives in
//! `src/main.rs`; tests run the router directly against an in-memory
//! store.

pub mod auth;
pub mod error;
pub mod facts;
pub mod posts;
pub mod session;
pub mod tokens;
pub mod votes;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use factum_core::store::ContentStore;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_token_ttl_hours() -> i64 { 24 }
fn default_api_token_ttl_days() -> i64 { 365 }

/// Runtime server configuration, deserialised from `config.toml` and
/// `FACTUM_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Shared secret for session-token signing.
  pub jwt_secret: String,
  /// Session token lifetime.
  #[serde(default = "default_token_ttl_hours")]
  pub token_ttl_hours: i64,
  /// Default API-token lifetime for `/generate-token`.
  #[serde(default = "default_api_token_ttl_days")]
  pub api_token_ttl_days: i64,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ContentStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ContentStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Auth
    .route("/auth/register", post(session::register::<S>))
    .route("/auth/login", post(session::login::<S>))
    // Facts
    .route("/facts", get(facts::list::<S>).post(facts::create::<S>))
    .route("/facts/public", get(facts::list_public::<S>))
    .route(
      "/facts/{slug}",
      get(facts::get_one::<S>)
        .put(facts::update::<S>)
        .delete(facts::delete::<S>),
    )
    .route("/facts/{slug}/publish", post(facts::publish::<S>))
    .route(
      "/facts/{slug}/vote",
      post(votes::cast::<S>)
        .get(votes::get_own::<S>)
        .delete(votes::delete_own::<S>),
    )
    // Posts
    .route("/posts", get(posts::list_own::<S>).post(posts::create::<S>))
    .route("/posts/public", get(posts::list_public::<S>))
    .route(
      "/posts/{slug}",
      get(posts::get_one::<S>)
        .put(posts::update::<S>)
        .delete(posts::delete::<S>),
    )
    .route("/posts/{slug}/publish", post(posts::publish::<S>))
    // API tokens
    .route("/generate-token", post(tokens::generate::<S>))
    .route("/tokens", get(tokens::list::<S>))
    .route("/tokens/{id}", delete(tokens::revoke::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
