//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Status and rating enums
//! are stored as their lowercase wire strings. Decoding happens outside
//! the `conn.call` closures, on Raw* row structs, so closure error types
//! stay purely database errors.

use chrono::{DateTime, Utc};
use factum_core::{
  content::{Fact, Post, PublishStatus},
  token::ApiToken,
  user::{User, UserCredentials},
  vote::{Rating, Vote},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub id:            i64,
  pub email:         String,
  pub password_hash: Option<String>,
  pub display_name:  Option<String>,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:           self.id,
      email:        self.email,
      display_name: self.display_name,
      created_at:   decode_dt(&self.created_at)?,
    })
  }

  pub fn into_credentials(self) -> Result<UserCredentials> {
    let password_hash = self.password_hash.clone();
    Ok(UserCredentials { user: self.into_user()?, password_hash })
  }
}

/// Raw strings read directly from a `facts` row.
pub struct RawFact {
  pub id:         i64,
  pub slug:       String,
  pub claim:      String,
  pub answer:     String,
  pub status:     String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawFact {
  pub fn into_fact(self) -> Result<Fact> {
    Ok(Fact {
      id:         self.id,
      slug:       self.slug,
      claim:      self.claim,
      answer:     self.answer,
      status:     PublishStatus::parse(&self.status).map_err(Error::Core)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `posts` row.
pub struct RawPost {
  pub id:         i64,
  pub slug:       String,
  pub title:      String,
  pub content:    String,
  pub status:     String,
  pub author_id:  i64,
  pub created_at: String,
  pub updated_at: String,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:         self.id,
      slug:       self.slug,
      title:      self.title,
      content:    self.content,
      status:     PublishStatus::parse(&self.status).map_err(Error::Core)?,
      author_id:  self.author_id,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `votes` row.
pub struct RawVote {
  pub id:         i64,
  pub fact_id:    i64,
  pub user_id:    i64,
  pub rating:     String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawVote {
  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      id:         self.id,
      fact_id:    self.fact_id,
      user_id:    self.user_id,
      rating:     Rating::parse(&self.rating).map_err(Error::Core)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from an `api_tokens` row.
pub struct RawToken {
  pub id:         i64,
  pub user_id:    i64,
  pub token:      String,
  pub name:       Option<String>,
  pub created_at: String,
  pub expires_at: Option<String>,
  pub last_used:  Option<String>,
  pub is_revoked: bool,
}

impl RawToken {
  pub fn into_token(self) -> Result<ApiToken> {
    Ok(ApiToken {
      id:         self.id,
      user_id:    self.user_id,
      token:      self.token,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
      expires_at: decode_dt_opt(self.expires_at.as_deref())?,
      last_used:  decode_dt_opt(self.last_used.as_deref())?,
      is_revoked: self.is_revoked,
    })
  }
}
