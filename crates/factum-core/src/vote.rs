//! Vote types — per-user ratings of facts and their aggregate tally.
//!
//! The invariant is that a user holds at most one vote per fact; revoting
//! overwrites the rating in place. The constraint lives in the store
//! (`UNIQUE (fact_id, user_id)`), never in application check-then-act.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Rating ──────────────────────────────────────────────────────────────────

/// The three permitted rating categories. Anything else is rejected at the
/// API boundary, not coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
  Helpful,
  SomewhatHelpful,
  NotHelpful,
}

impl Rating {
  /// The string stored in the `rating` column and used on the wire.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Helpful => "helpful",
      Self::SomewhatHelpful => "somewhat_helpful",
      Self::NotHelpful => "not_helpful",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "helpful" => Ok(Self::Helpful),
      "somewhat_helpful" => Ok(Self::SomewhatHelpful),
      "not_helpful" => Ok(Self::NotHelpful),
      other => Err(Error::InvalidRating(other.to_owned())),
    }
  }
}

// ─── Vote ────────────────────────────────────────────────────────────────────

/// One user's rating of one fact. At most one row exists per
/// (fact, user) pair; `updated_at` moves on revote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
  pub id:         i64,
  pub fact_id:    i64,
  pub user_id:    i64,
  pub rating:     Rating,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── Tally ───────────────────────────────────────────────────────────────────

/// Per-category vote counts for a fact, recomputed from all vote rows at
/// the moment of the read. Never stored.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct VoteCounts {
  pub helpful:          u32,
  pub somewhat_helpful: u32,
  pub not_helpful:      u32,
}

impl VoteCounts {
  /// The number of distinct users who have voted.
  pub fn total(self) -> u32 {
    self.helpful + self.somewhat_helpful + self.not_helpful
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rating_roundtrip() {
    for r in [Rating::Helpful, Rating::SomewhatHelpful, Rating::NotHelpful] {
      assert_eq!(Rating::parse(r.as_str()).unwrap(), r);
    }
  }

  #[test]
  fn rating_rejects_unknown_category() {
    assert!(matches!(
      Rating::parse("very_helpful"),
      Err(Error::InvalidRating(_))
    ));
    assert!(Rating::parse("").is_err());
  }

  #[test]
  fn counts_total() {
    let counts = VoteCounts { helpful: 2, somewhat_helpful: 1, not_helpful: 3 };
    assert_eq!(counts.total(), 6);
    assert_eq!(VoteCounts::default().total(), 0);
  }
}
