use std::{path::PathBuf, sync::Arc};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use factum_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;

async fn make_state() -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  AppState {
    store:  Arc::new(store),
    config: Arc::new(ServerConfig {
      host:               "127.0.0.1".to_string(),
      port:               8080,
      store_path:         PathBuf::from(":memory:"),
      jwt_secret:         "test-secret".to_string(),
      token_ttl_hours:    24,
      api_token_ttl_days: 30,
    }),
  }
}

/// Fire one request at a fresh router over `state` and decode the JSON
/// response (204s and other empty bodies come back as `Value::Null`).
async fn send(
  state:  &AppState<SqliteStore>,
  method: &str,
  uri:    &str,
  bearer: Option<&str>,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = bearer {
    builder =
      builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let req = match body {
    Some(v) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = router(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

/// Register `email` and return a session token for it.
async fn login_as(state: &AppState<SqliteStore>, email: &str) -> String {
  let (status, _) = send(
    state,
    "POST",
    "/auth/register",
    None,
    Some(json!({ "email": email, "password": "hunter2" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, body) = send(
    state,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": email, "password": "hunter2" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  body["token"].as_str().unwrap().to_string()
}

async fn create_fact(
  state:  &AppState<SqliteStore>,
  token:  &str,
  claim:  &str,
  status: &str,
) -> Value {
  let (code, body) = send(
    state,
    "POST",
    "/facts",
    Some(token),
    Some(json!({ "claim": claim, "answer": "No.", "status": status })),
  )
  .await;
  assert_eq!(code, StatusCode::CREATED);
  body
}

// ── Auth ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_login_issues_token() {
  let state = make_state().await;
  let token = login_as(&state, "alice@example.com").await;
  assert!(!token.is_empty());

  // The token authenticates a protected endpoint.
  let (status, _) = send(&state, "GET", "/posts", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let state = make_state().await;
  login_as(&state, "alice@example.com").await;

  let (status, body) = send(
    &state,
    "POST",
    "/auth/register",
    None,
    Some(json!({ "email": "alice@example.com", "password": "other" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"], "email_taken");
}

#[tokio::test]
async fn wrong_password_collapses_to_invalid_credentials() {
  let state = make_state().await;
  login_as(&state, "alice@example.com").await;

  for (email, pass) in [
    ("alice@example.com", "wrong"),
    ("nobody@example.com", "hunter2"),
  ] {
    let (status, body) = send(
      &state,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "email": email, "password": pass })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");
  }
}

#[tokio::test]
async fn anonymous_mutation_is_rejected() {
  let state = make_state().await;
  let (status, body) = send(
    &state,
    "POST",
    "/facts",
    None,
    Some(json!({ "claim": "The moon is cheese", "answer": "No." })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "unauthenticated");
}

// ── Facts ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_fact_carries_derived_slug() {
  let state = make_state().await;
  let token = login_as(&state, "alice@example.com").await;

  let fact =
    create_fact(&state, &token, "The sky is green", "published").await;
  assert_eq!(fact["slug"], "the-sky-is-green");

  let (status, body) =
    send(&state, "GET", "/facts/the-sky-is-green", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["claim"], "The sky is green");
  assert_eq!(body["voteCounts"]["helpful"], 0);
}

#[tokio::test]
async fn public_listing_excludes_drafts() {
  let state = make_state().await;
  let token = login_as(&state, "alice@example.com").await;

  create_fact(&state, &token, "Published claim", "published").await;
  create_fact(&state, &token, "Draft claim", "draft").await;

  let (status, body) = send(&state, "GET", "/facts/public", None, None).await;
  assert_eq!(status, StatusCode::OK);
  let rows = body.as_array().unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["slug"], "published-claim");

  // The authenticated listing shows both.
  let (_, body) = send(&state, "GET", "/facts", Some(&token), None).await;
  assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_fact_is_404() {
  let state = make_state().await;
  let (status, body) = send(&state, "GET", "/facts/no-such", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "fact_not_found");
}

// ── Votes ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn revote_overwrites_and_tally_follows() {
  let state = make_state().await;
  let alice = login_as(&state, "alice@example.com").await;
  let bob = login_as(&state, "bob@example.com").await;
  create_fact(&state, &alice, "The earth is flat", "published").await;

  let uri = "/facts/the-earth-is-flat/vote";

  let (status, body) =
    send(&state, "POST", uri, Some(&alice), Some(json!({ "rating": "helpful" })))
      .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["voteCounts"]["helpful"], 1);

  // Alice changes her mind; her old vote is replaced, not added to.
  let (_, body) = send(
    &state,
    "POST",
    uri,
    Some(&alice),
    Some(json!({ "rating": "not_helpful" })),
  )
  .await;
  assert_eq!(body["voteCounts"]["helpful"], 0);
  assert_eq!(body["voteCounts"]["not_helpful"], 1);

  let (_, body) =
    send(&state, "POST", uri, Some(&bob), Some(json!({ "rating": "helpful" })))
      .await;
  assert_eq!(body["voteCounts"]["helpful"], 1);
  assert_eq!(body["voteCounts"]["somewhat_helpful"], 0);
  assert_eq!(body["voteCounts"]["not_helpful"], 1);
}

#[tokio::test]
async fn invalid_rating_is_rejected_without_mutating() {
  let state = make_state().await;
  let token = login_as(&state, "alice@example.com").await;
  create_fact(&state, &token, "The moon is cheese", "published").await;

  let uri = "/facts/the-moon-is-cheese/vote";
  let (status, body) = send(
    &state,
    "POST",
    uri,
    Some(&token),
    Some(json!({ "rating": "amazing" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "invalid_rating");

  let (_, body) = send(&state, "GET", uri, Some(&token), None).await;
  assert!(body.is_null());
}

#[tokio::test]
async fn vote_on_unknown_fact_is_404() {
  let state = make_state().await;
  let token = login_as(&state, "alice@example.com").await;
  let (status, body) = send(
    &state,
    "POST",
    "/facts/no-such/vote",
    Some(&token),
    Some(json!({ "rating": "helpful" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "fact_not_found");
}

#[tokio::test]
async fn deleting_a_vote_is_idempotent() {
  let state = make_state().await;
  let token = login_as(&state, "alice@example.com").await;
  create_fact(&state, &token, "The moon is cheese", "published").await;

  let uri = "/facts/the-moon-is-cheese/vote";
  send(&state, "POST", uri, Some(&token), Some(json!({ "rating": "helpful" })))
    .await;

  let (status, _) = send(&state, "DELETE", uri, Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  // Deleting again is still a 204.
  let (status, _) = send(&state, "DELETE", uri, Some(&token), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, body) = send(&state, "GET", uri, Some(&token), None).await;
  assert!(body.is_null());
}

// ── Posts ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn post_mutation_by_non_owner_looks_like_404() {
  let state = make_state().await;
  let alice = login_as(&state, "alice@example.com").await;
  let bob = login_as(&state, "bob@example.com").await;

  let (status, body) = send(
    &state,
    "POST",
    "/posts",
    Some(&alice),
    Some(json!({
      "title": "My post", "content": "body", "status": "published"
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["slug"], "my-post");

  let (status, body) = send(
    &state,
    "PUT",
    "/posts/my-post",
    Some(&bob),
    Some(json!({ "title": "Hijacked" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "post_not_found");

  let (status, _) =
    send(&state, "DELETE", "/posts/my-post", Some(&bob), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  // The owner still can.
  let (status, body) = send(
    &state,
    "PUT",
    "/posts/my-post",
    Some(&alice),
    Some(json!({ "title": "Renamed" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["title"], "Renamed");
}

#[tokio::test]
async fn draft_post_is_visible_to_its_owner_only() {
  let state = make_state().await;
  let alice = login_as(&state, "alice@example.com").await;
  let bob = login_as(&state, "bob@example.com").await;

  send(
    &state,
    "POST",
    "/posts",
    Some(&alice),
    Some(json!({ "title": "Work in progress", "content": "..." })),
  )
  .await;

  let (status, _) =
    send(&state, "GET", "/posts/work-in-progress", Some(&alice), None).await;
  assert_eq!(status, StatusCode::OK);

  for bearer in [Some(bob.as_str()), None] {
    let (status, _) =
      send(&state, "GET", "/posts/work-in-progress", bearer, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // Publishing makes it public.
  let (status, body) = send(
    &state,
    "POST",
    "/posts/work-in-progress/publish",
    Some(&alice),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "published");

  let (status, _) =
    send(&state, "GET", "/posts/work-in-progress", None, None).await;
  assert_eq!(status, StatusCode::OK);
}

// ── API tokens ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn token_lifecycle() {
  let state = make_state().await;
  let session = login_as(&state, "alice@example.com").await;

  let (status, body) = send(
    &state,
    "POST",
    "/generate-token",
    Some(&session),
    Some(json!({ "name": "ci" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let secret = body["token"].as_str().unwrap().to_string();
  let id = body["id"].as_i64().unwrap();
  assert_eq!(secret.len(), 64);

  // Listings never expose the full secret.
  let (_, body) = send(&state, "GET", "/tokens", Some(&session), None).await;
  let rows = body["tokens"].as_array().unwrap();
  assert_eq!(rows.len(), 1);
  let masked = rows[0]["token"].as_str().unwrap();
  assert_ne!(masked, secret);
  assert!(masked.contains("..."));
  assert_eq!(rows[0]["name"], "ci");

  // The raw secret works as a bearer credential.
  let (status, _) = send(&state, "GET", "/posts", Some(&secret), None).await;
  assert_eq!(status, StatusCode::OK);

  // Revoke, then the credential and the listing both drop it.
  let (status, _) =
    send(&state, "DELETE", &format!("/tokens/{id}"), Some(&session), None)
      .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(&state, "GET", "/posts", Some(&secret), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (_, body) = send(&state, "GET", "/tokens", Some(&session), None).await;
  assert!(body["tokens"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn revoking_someone_elses_token_is_404() {
  let state = make_state().await;
  let alice = login_as(&state, "alice@example.com").await;
  let bob = login_as(&state, "bob@example.com").await;

  let (_, body) =
    send(&state, "POST", "/generate-token", Some(&alice), None).await;
  let id = body["id"].as_i64().unwrap();

  let (status, body) =
    send(&state, "DELETE", &format!("/tokens/{id}"), Some(&bob), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "token_not_found");
}
