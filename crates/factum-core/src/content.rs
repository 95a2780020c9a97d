//! Content entities — facts and posts.
//!
//! Both entity kinds share a draft/published lifecycle and a derived slug
//! that serves as their durable public identity (distinct from the numeric
//! primary key). Facts are collaboratively editable; posts are owned by
//! their author and mutable only by them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  vote::{Vote, VoteCounts},
};

// ─── Lifecycle ───────────────────────────────────────────────────────────────

/// Draft/published lifecycle shared by facts and posts.
/// Drafts never appear in public listings.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
  #[default]
  Draft,
  Published,
}

impl PublishStatus {
  /// The string stored in the `status` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::Published => "published",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "draft" => Ok(Self::Draft),
      "published" => Ok(Self::Published),
      other => Err(Error::InvalidStatus(other.to_owned())),
    }
  }
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// A fact-check entry: a claim and its verdict/answer.
///
/// Facts carry no owner — any authenticated user may edit or delete one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
  pub id:         i64,
  /// Derived from `claim`; unique, regenerated only when the claim changes.
  pub slug:       String,
  pub claim:      String,
  pub answer:     String,
  pub status:     PublishStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::ContentStore::create_fact`].
/// The slug is always store-derived; callers never supply one.
#[derive(Debug, Clone)]
pub struct NewFact {
  pub claim:  String,
  pub answer: String,
  /// Defaults to [`PublishStatus::Draft`] when absent.
  pub status: Option<PublishStatus>,
}

/// Partial update for a fact. Absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct FactPatch {
  pub claim:  Option<String>,
  pub answer: Option<String>,
  pub status: Option<PublishStatus>,
}

/// A fact enriched with the viewer's own votes and the global tally —
/// the read model returned by listings and single-fact reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactWithVotes {
  #[serde(flatten)]
  pub fact:        Fact,
  /// The requesting user's votes only (zero or one entry); empty when
  /// the request is anonymous.
  pub votes:       Vec<Vote>,
  #[serde(rename = "voteCounts")]
  pub vote_counts: VoteCounts,
}

// ─── Posts ───────────────────────────────────────────────────────────────────

/// A blog post, exclusively owned by its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub id:         i64,
  /// Derived from `title`; unique, regenerated only when the title changes.
  pub slug:       String,
  pub title:      String,
  pub content:    String,
  pub status:     PublishStatus,
  pub author_id:  i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::ContentStore::create_post`]. The author id
/// comes from the resolved identity, never from the request body.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub title:   String,
  pub content: String,
  pub status:  Option<PublishStatus>,
}

/// Partial update for a post. Absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
  pub title:   Option<String>,
  pub content: Option<String>,
  pub status:  Option<PublishStatus>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_roundtrip() {
    assert_eq!(
      PublishStatus::parse(PublishStatus::Draft.as_str()).unwrap(),
      PublishStatus::Draft
    );
    assert_eq!(
      PublishStatus::parse(PublishStatus::Published.as_str()).unwrap(),
      PublishStatus::Published
    );
    assert!(PublishStatus::parse("archived").is_err());
  }

  #[test]
  fn status_defaults_to_draft() {
    assert_eq!(PublishStatus::default(), PublishStatus::Draft);
  }
}
