//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error carries a machine-stable kind string alongside the human
//! message, so clients match on `error` rather than parsing free text:
//!
//! ```json
//! { "error": "fact_not_found", "message": "fact no-such-slug not found" }
//! ```

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing, malformed, expired, or revoked bearer credential.
  #[error("authentication required")]
  Unauthenticated,

  /// Login with an unknown email or a wrong password. Deliberately one
  /// variant for both, so account existence never leaks.
  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("unknown rating: {0:?}")]
  InvalidRating(String),

  #[error("fact {0} not found")]
  FactNotFound(String),

  /// Also covers posts owned by someone else.
  #[error("post {0} not found")]
  PostNotFound(String),

  #[error("token {0} not found")]
  TokenNotFound(i64),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// The stable kind string serialised in the `error` field.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Unauthenticated => "unauthenticated",
      Self::InvalidCredentials => "invalid_credentials",
      Self::EmailTaken(_) => "email_taken",
      Self::InvalidRating(_) => "invalid_rating",
      Self::FactNotFound(_) => "fact_not_found",
      Self::PostNotFound(_) => "post_not_found",
      Self::TokenNotFound(_) => "token_not_found",
      Self::BadRequest(_) => "bad_request",
      Self::Internal(_) => "internal_error",
      Self::Store(_) => "store_error",
    }
  }

  fn status(&self) -> StatusCode {
    match self {
      Self::Unauthenticated | Self::InvalidCredentials => {
        StatusCode::UNAUTHORIZED
      }
      Self::EmailTaken(_) => StatusCode::CONFLICT,
      Self::InvalidRating(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::FactNotFound(_) | Self::PostNotFound(_) | Self::TokenNotFound(_) => {
        StatusCode::NOT_FOUND
      }
      Self::Internal(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = json!({ "error": self.kind(), "message": self.to_string() });
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kinds_are_stable() {
    assert_eq!(ApiError::Unauthenticated.kind(), "unauthenticated");
    assert_eq!(ApiError::FactNotFound("x".into()).kind(), "fact_not_found");
    assert_eq!(ApiError::InvalidRating("x".into()).kind(), "invalid_rating");
    assert_eq!(ApiError::EmailTaken("a@b".into()).kind(), "email_taken");
  }

  #[test]
  fn status_mapping() {
    assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
      ApiError::PostNotFound("x".into()).status(),
      StatusCode::NOT_FOUND
    );
    assert_eq!(
      ApiError::InvalidRating("x".into()).status(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(ApiError::EmailTaken("x".into()).status(), StatusCode::CONFLICT);
  }
}
