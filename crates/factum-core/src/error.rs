//! Error types for `factum-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(i64),

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("fact not found: {0}")]
  FactNotFound(String),

  #[error("post not found: {0}")]
  PostNotFound(String),

  #[error("unknown rating: {0:?}")]
  InvalidRating(String),

  #[error("unknown publish status: {0:?}")]
  InvalidStatus(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
