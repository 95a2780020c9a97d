//! API tokens — opaque bearer credentials for programmatic access.
//!
//! Tokens are revoked by flag, never deleted, so the audit trail survives.
//! A token is usable only while `is_revoked` is false and `expires_at` is
//! null or in the future.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored API token. The `token` field holds the full secret; use
/// [`ApiToken::masked`] before returning one in a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToken {
  pub id:         i64,
  pub user_id:    i64,
  /// 64 hex characters (32 random bytes), unique.
  pub token:      String,
  pub name:       Option<String>,
  pub created_at: DateTime<Utc>,
  /// `None` means the token never expires.
  pub expires_at: Option<DateTime<Utc>>,
  pub last_used:  Option<DateTime<Utc>>,
  pub is_revoked: bool,
}

impl ApiToken {
  /// Whether the token is accepted as a credential at `now`.
  pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
    !self.is_revoked && self.expires_at.is_none_or(|exp| exp > now)
  }

  /// `abcd...wxyz` — first and last four characters of the secret.
  /// Listings only ever expose this form.
  pub fn masked(&self) -> String {
    if self.token.len() <= 8 {
      return self.token.clone();
    }
    format!(
      "{}...{}",
      &self.token[..4],
      &self.token[self.token.len() - 4..]
    )
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  fn token(expires_at: Option<DateTime<Utc>>, is_revoked: bool) -> ApiToken {
    ApiToken {
      id: 1,
      user_id: 1,
      token: "0123456789abcdef0123456789abcdef".into(),
      name: None,
      created_at: Utc::now(),
      expires_at,
      last_used: None,
      is_revoked,
    }
  }

  #[test]
  fn usable_without_expiry() {
    assert!(token(None, false).is_usable(Utc::now()));
  }

  #[test]
  fn revoked_is_never_usable() {
    assert!(!token(None, true).is_usable(Utc::now()));
  }

  #[test]
  fn expired_is_not_usable() {
    let now = Utc::now();
    assert!(!token(Some(now - Duration::hours(1)), false).is_usable(now));
    assert!(token(Some(now + Duration::hours(1)), false).is_usable(now));
  }

  #[test]
  fn masked_shows_only_edges() {
    let t = token(None, false);
    assert_eq!(t.masked(), "0123...cdef");
  }

  #[test]
  fn masked_short_token_passes_through() {
    let mut t = token(None, false);
    t.token = "abcd".into();
    assert_eq!(t.masked(), "abcd");
  }
}
