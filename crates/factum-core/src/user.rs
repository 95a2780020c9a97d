//! User — the owning identity for posts, votes, and API tokens.
//!
//! Users are created at registration and never deleted. The numeric id is
//! the authoritative key; email is unique but mutable in principle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. The password hash never leaves the store layer;
/// see [`UserCredentials`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:           i64,
  pub email:        String,
  pub display_name: Option<String>,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::ContentStore::create_user`].
/// The password arrives already hashed (argon2 PHC string); the core and
/// store layers never see plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub password_hash: Option<String>,
  pub display_name:  Option<String>,
}

/// A user joined with their stored password hash, for credential checks
/// during login. Not serializable on purpose.
#[derive(Debug, Clone)]
pub struct UserCredentials {
  pub user:          User,
  pub password_hash: Option<String>,
}
