//! [`SqliteStore`] — the SQLite implementation of [`ContentStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore as _};
use rusqlite::OptionalExtension as _;

use factum_core::{
  content::{Fact, FactPatch, FactWithVotes, NewFact, NewPost, Post, PostPatch},
  slug::slugify,
  store::ContentStore,
  token::ApiToken,
  user::{NewUser, User, UserCredentials},
  vote::{Rating, Vote, VoteCounts},
};

use crate::{
  Error, Result,
  encode::{RawFact, RawPost, RawToken, RawUser, RawVote, encode_dt},
  schema::SCHEMA,
};

const FACT_COLS: &str = "id, slug, claim, answer, status, created_at, updated_at";
const POST_COLS: &str =
  "id, slug, title, content, status, author_id, created_at, updated_at";
const VOTE_COLS: &str = "id, fact_id, user_id, rating, created_at, updated_at";
const TOKEN_COLS: &str =
  "id, user_id, token, name, created_at, expires_at, last_used, is_revoked";

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn fact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawFact> {
  Ok(RawFact {
    id:         row.get(0)?,
    slug:       row.get(1)?,
    claim:      row.get(2)?,
    answer:     row.get(3)?,
    status:     row.get(4)?,
    created_at: row.get(5)?,
    updated_at: row.get(6)?,
  })
}

fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPost> {
  Ok(RawPost {
    id:         row.get(0)?,
    slug:       row.get(1)?,
    title:      row.get(2)?,
    content:    row.get(3)?,
    status:     row.get(4)?,
    author_id:  row.get(5)?,
    created_at: row.get(6)?,
    updated_at: row.get(7)?,
  })
}

fn vote_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawVote> {
  Ok(RawVote {
    id:         row.get(0)?,
    fact_id:    row.get(1)?,
    user_id:    row.get(2)?,
    rating:     row.get(3)?,
    created_at: row.get(4)?,
    updated_at: row.get(5)?,
  })
}

fn token_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawToken> {
  Ok(RawToken {
    id:         row.get(0)?,
    user_id:    row.get(1)?,
    token:      row.get(2)?,
    name:       row.get(3)?,
    created_at: row.get(4)?,
    expires_at: row.get(5)?,
    last_used:  row.get(6)?,
    is_revoked: row.get(7)?,
  })
}

// ─── In-closure helpers ──────────────────────────────────────────────────────

/// Find a slug not yet taken in `table`, starting from `base` and appending
/// `-2`, `-3`, ... on collision. `exclude_id` lets an update keep its own
/// slug. The UNIQUE index remains the backstop for races.
fn unique_slug(
  conn:       &rusqlite::Connection,
  table:      &str,
  base:       &str,
  exclude_id: Option<i64>,
) -> rusqlite::Result<String> {
  let sql = format!("SELECT 1 FROM {table} WHERE slug = ?1 AND id != ?2");
  let mut stmt = conn.prepare(&sql)?;
  let exclude = exclude_id.unwrap_or(-1);

  let mut candidate = base.to_owned();
  let mut n = 2u32;
  while stmt.exists(rusqlite::params![candidate, exclude])? {
    candidate = format!("{base}-{n}");
    n += 1;
  }
  Ok(candidate)
}

/// Recompute the per-category tally for a fact by scanning its vote rows.
fn tally(
  conn:    &rusqlite::Connection,
  fact_id: i64,
) -> rusqlite::Result<VoteCounts> {
  let mut stmt = conn.prepare(
    "SELECT rating, COUNT(*) FROM votes WHERE fact_id = ?1 GROUP BY rating",
  )?;
  let rows = stmt.query_map([fact_id], |row| {
    Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
  })?;

  let mut counts = VoteCounts::default();
  for row in rows {
    let (rating, n) = row?;
    match rating.as_str() {
      "helpful" => counts.helpful = n,
      "somewhat_helpful" => counts.somewhat_helpful = n,
      "not_helpful" => counts.not_helpful = n,
      // Unreachable given the API-boundary validation; skip rather than
      // fail the whole tally.
      _ => {}
    }
  }
  Ok(counts)
}

/// The viewer's own votes on a fact (zero or one row).
fn viewer_votes(
  conn:    &rusqlite::Connection,
  fact_id: i64,
  viewer:  Option<i64>,
) -> rusqlite::Result<Vec<RawVote>> {
  let Some(user_id) = viewer else {
    return Ok(Vec::new());
  };
  let mut stmt = conn.prepare(&format!(
    "SELECT {VOTE_COLS} FROM votes WHERE fact_id = ?1 AND user_id = ?2"
  ))?;
  stmt
    .query_map(rusqlite::params![fact_id, user_id], vote_from_row)?
    .collect()
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Factum content store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// statements run serialised on the connection's worker thread, so a tally
/// read issued after an upsert always observes that upsert.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load a fact row and enrich it with viewer votes and the tally.
  async fn fact_with_votes(
    &self,
    slug:   String,
    viewer: Option<i64>,
  ) -> Result<Option<(RawFact, Vec<RawVote>, VoteCounts)>> {
    let row = self
      .conn
      .call(move |conn| {
        let raw: Option<RawFact> = conn
          .query_row(
            &format!("SELECT {FACT_COLS} FROM facts WHERE slug = ?1"),
            rusqlite::params![slug],
            fact_from_row,
          )
          .optional()?;

        let Some(raw) = raw else { return Ok(None) };
        let votes = viewer_votes(conn, raw.id, viewer)?;
        let counts = tally(conn, raw.id)?;
        Ok(Some((raw, votes, counts)))
      })
      .await?;
    Ok(row)
  }
}

fn assemble_fact(
  raw:    RawFact,
  votes:  Vec<RawVote>,
  counts: VoteCounts,
) -> Result<FactWithVotes> {
  Ok(FactWithVotes {
    fact:        raw.into_fact()?,
    votes:       votes
      .into_iter()
      .map(RawVote::into_vote)
      .collect::<Result<_>>()?,
    vote_counts: counts,
  })
}

// ─── ContentStore impl ───────────────────────────────────────────────────────

impl ContentStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let now = Utc::now();
    let now_str = encode_dt(now);
    let NewUser { email, password_hash, display_name } = input;

    let inserted: Option<i64> = self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO users (email, password_hash, display_name, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![email, password_hash, display_name, now_str],
        );
        match res {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_constraint_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    match inserted {
      Some(id) => Ok(self.get_user(id).await?),
      None => Ok(None),
    }
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, email, password_hash, display_name, created_at
               FROM users WHERE id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawUser {
                  id:            row.get(0)?,
                  email:         row.get(1)?,
                  password_hash: row.get(2)?,
                  display_name:  row.get(3)?,
                  created_at:    row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_credentials(
    &self,
    email: &str,
  ) -> Result<Option<UserCredentials>> {
    let email = email.to_owned();
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, email, password_hash, display_name, created_at
               FROM users WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(RawUser {
                  id:            row.get(0)?,
                  email:         row.get(1)?,
                  password_hash: row.get(2)?,
                  display_name:  row.get(3)?,
                  created_at:    row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_credentials).transpose()
  }

  // ── Facts ─────────────────────────────────────────────────────────────

  async fn list_facts(
    &self,
    viewer:      Option<i64>,
    public_only: bool,
  ) -> Result<Vec<FactWithVotes>> {
    let rows: Vec<(RawFact, Vec<RawVote>, VoteCounts)> = self
      .conn
      .call(move |conn| {
        let sql = if public_only {
          format!(
            "SELECT {FACT_COLS} FROM facts WHERE status = 'published'
             ORDER BY created_at DESC, id DESC"
          )
        } else {
          format!(
            "SELECT {FACT_COLS} FROM facts ORDER BY created_at DESC, id DESC"
          )
        };

        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map([], fact_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for raw in raws {
          let votes = viewer_votes(conn, raw.id, viewer)?;
          let counts = tally(conn, raw.id)?;
          out.push((raw, votes, counts));
        }
        Ok(out)
      })
      .await?;

    rows
      .into_iter()
      .map(|(raw, votes, counts)| assemble_fact(raw, votes, counts))
      .collect()
  }

  async fn get_fact(
    &self,
    slug:   &str,
    viewer: Option<i64>,
  ) -> Result<Option<FactWithVotes>> {
    let row = self.fact_with_votes(slug.to_owned(), viewer).await?;
    row
      .map(|(raw, votes, counts)| assemble_fact(raw, votes, counts))
      .transpose()
  }

  async fn find_fact_id(&self, slug: &str) -> Result<Option<i64>> {
    let slug = slug.to_owned();
    let id = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id FROM facts WHERE slug = ?1",
              rusqlite::params![slug],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(id)
  }

  async fn create_fact(&self, input: NewFact) -> Result<Fact> {
    let now_str = encode_dt(Utc::now());
    let base = slugify(&input.claim);
    let NewFact { claim, answer, status } = input;
    let status_str = status.unwrap_or_default().as_str();

    let raw: RawFact = self
      .conn
      .call(move |conn| {
        let slug = unique_slug(conn, "facts", &base, None)?;
        conn.execute(
          "INSERT INTO facts (slug, claim, answer, status, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![slug, claim, answer, status_str, now_str],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
          &format!("SELECT {FACT_COLS} FROM facts WHERE id = ?1"),
          rusqlite::params![id],
          fact_from_row,
        )?)
      })
      .await?;

    raw.into_fact()
  }

  async fn update_fact(
    &self,
    slug:  &str,
    patch: FactPatch,
  ) -> Result<Option<Fact>> {
    let slug = slug.to_owned();
    let now_str = encode_dt(Utc::now());
    let FactPatch { claim, answer, status } = patch;
    let status_str = status.map(|s| s.as_str().to_owned());

    let raw: Option<RawFact> = self
      .conn
      .call(move |conn| {
        let existing: Option<RawFact> = conn
          .query_row(
            &format!("SELECT {FACT_COLS} FROM facts WHERE slug = ?1"),
            rusqlite::params![slug],
            fact_from_row,
          )
          .optional()?;
        let Some(existing) = existing else { return Ok(None) };

        // Permalinks only churn when the claim text actually changes.
        let new_claim = claim.unwrap_or_else(|| existing.claim.clone());
        let new_slug = if new_claim != existing.claim {
          unique_slug(conn, "facts", &slugify(&new_claim), Some(existing.id))?
        } else {
          existing.slug.clone()
        };
        let new_answer = answer.unwrap_or_else(|| existing.answer.clone());
        let new_status = status_str.unwrap_or_else(|| existing.status.clone());

        conn.execute(
          "UPDATE facts
           SET slug = ?1, claim = ?2, answer = ?3, status = ?4, updated_at = ?5
           WHERE id = ?6",
          rusqlite::params![
            new_slug, new_claim, new_answer, new_status, now_str, existing.id
          ],
        )?;

        Ok(Some(conn.query_row(
          &format!("SELECT {FACT_COLS} FROM facts WHERE id = ?1"),
          rusqlite::params![existing.id],
          fact_from_row,
        )?))
      })
      .await?;

    raw.map(RawFact::into_fact).transpose()
  }

  async fn delete_fact(&self, slug: &str) -> Result<bool> {
    let slug = slug.to_owned();
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM facts WHERE slug = ?1",
          rusqlite::params![slug],
        )?)
      })
      .await?;
    Ok(affected > 0)
  }

  // ── Posts ─────────────────────────────────────────────────────────────

  async fn list_posts_for_author(&self, author_id: i64) -> Result<Vec<Post>> {
    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLS} FROM posts WHERE author_id = ?1
           ORDER BY created_at DESC, id DESC"
        ))?;
        Ok(
          stmt
            .query_map(rusqlite::params![author_id], post_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        )
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn list_public_posts(&self) -> Result<Vec<Post>> {
    let raws: Vec<RawPost> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLS} FROM posts WHERE status = 'published'
           ORDER BY created_at DESC, id DESC"
        ))?;
        Ok(
          stmt
            .query_map([], post_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        )
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn get_post(&self, slug: &str) -> Result<Option<Post>> {
    let slug = slug.to_owned();
    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {POST_COLS} FROM posts WHERE slug = ?1"),
              rusqlite::params![slug],
              post_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn create_post(&self, author_id: i64, input: NewPost) -> Result<Post> {
    let now_str = encode_dt(Utc::now());
    let base = slugify(&input.title);
    let NewPost { title, content, status } = input;
    let status_str = status.unwrap_or_default().as_str();

    let raw: RawPost = self
      .conn
      .call(move |conn| {
        let slug = unique_slug(conn, "posts", &base, None)?;
        conn.execute(
          "INSERT INTO posts
             (slug, title, content, status, author_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![slug, title, content, status_str, author_id, now_str],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
          &format!("SELECT {POST_COLS} FROM posts WHERE id = ?1"),
          rusqlite::params![id],
          post_from_row,
        )?)
      })
      .await?;

    raw.into_post()
  }

  async fn update_post(
    &self,
    slug:      &str,
    author_id: i64,
    patch:     PostPatch,
  ) -> Result<Option<Post>> {
    let slug = slug.to_owned();
    let now_str = encode_dt(Utc::now());
    let PostPatch { title, content, status } = patch;
    let status_str = status.map(|s| s.as_str().to_owned());

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        let existing: Option<RawPost> = conn
          .query_row(
            &format!("SELECT {POST_COLS} FROM posts WHERE slug = ?1"),
            rusqlite::params![slug],
            post_from_row,
          )
          .optional()?;
        let Some(existing) = existing else { return Ok(None) };

        // Not-owned collapses to not-found so existence never leaks.
        if existing.author_id != author_id {
          return Ok(None);
        }

        let new_title = title.unwrap_or_else(|| existing.title.clone());
        let new_slug = if new_title != existing.title {
          unique_slug(conn, "posts", &slugify(&new_title), Some(existing.id))?
        } else {
          existing.slug.clone()
        };
        let new_content = content.unwrap_or_else(|| existing.content.clone());
        let new_status = status_str.unwrap_or_else(|| existing.status.clone());

        conn.execute(
          "UPDATE posts
           SET slug = ?1, title = ?2, content = ?3, status = ?4, updated_at = ?5
           WHERE id = ?6",
          rusqlite::params![
            new_slug, new_title, new_content, new_status, now_str, existing.id
          ],
        )?;

        Ok(Some(conn.query_row(
          &format!("SELECT {POST_COLS} FROM posts WHERE id = ?1"),
          rusqlite::params![existing.id],
          post_from_row,
        )?))
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn delete_post(&self, slug: &str, author_id: i64) -> Result<bool> {
    let slug = slug.to_owned();
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM posts WHERE slug = ?1 AND author_id = ?2",
          rusqlite::params![slug, author_id],
        )?)
      })
      .await?;
    Ok(affected > 0)
  }

  // ── Votes ─────────────────────────────────────────────────────────────

  async fn cast_vote(
    &self,
    fact_id: i64,
    user_id: i64,
    rating:  Rating,
  ) -> Result<(Vote, VoteCounts)> {
    let now_str = encode_dt(Utc::now());
    let rating_str = rating.as_str();

    let (raw, counts): (RawVote, VoteCounts) = self
      .conn
      .call(move |conn| {
        // Single atomic upsert keyed on the (fact_id, user_id) constraint;
        // created_at survives a revote, updated_at moves.
        conn.execute(
          "INSERT INTO votes (fact_id, user_id, rating, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)
           ON CONFLICT (fact_id, user_id)
           DO UPDATE SET rating = excluded.rating,
                         updated_at = excluded.updated_at",
          rusqlite::params![fact_id, user_id, rating_str, now_str],
        )?;

        let raw = conn.query_row(
          &format!(
            "SELECT {VOTE_COLS} FROM votes WHERE fact_id = ?1 AND user_id = ?2"
          ),
          rusqlite::params![fact_id, user_id],
          vote_from_row,
        )?;

        // Tally in the same call so the response reflects this write.
        let counts = tally(conn, fact_id)?;
        Ok((raw, counts))
      })
      .await?;

    Ok((raw.into_vote()?, counts))
  }

  async fn get_vote(&self, fact_id: i64, user_id: i64) -> Result<Option<Vote>> {
    let raw: Option<RawVote> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {VOTE_COLS} FROM votes
                 WHERE fact_id = ?1 AND user_id = ?2"
              ),
              rusqlite::params![fact_id, user_id],
              vote_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVote::into_vote).transpose()
  }

  async fn delete_vote(&self, fact_id: i64, user_id: i64) -> Result<bool> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM votes WHERE fact_id = ?1 AND user_id = ?2",
          rusqlite::params![fact_id, user_id],
        )?)
      })
      .await?;
    Ok(affected > 0)
  }

  async fn vote_counts(&self, fact_id: i64) -> Result<VoteCounts> {
    let counts = self.conn.call(move |conn| Ok(tally(conn, fact_id)?)).await?;
    Ok(counts)
  }

  // ── API tokens ────────────────────────────────────────────────────────

  async fn issue_token(
    &self,
    user_id:    i64,
    name:       Option<String>,
    expires_at: Option<DateTime<Utc>>,
  ) -> Result<ApiToken> {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let token = hex::encode(bytes);

    let now_str = encode_dt(Utc::now());
    let expires_str = expires_at.map(encode_dt);

    let raw: RawToken = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO api_tokens (token, user_id, name, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![token, user_id, name, now_str, expires_str],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
          &format!("SELECT {TOKEN_COLS} FROM api_tokens WHERE id = ?1"),
          rusqlite::params![id],
          token_from_row,
        )?)
      })
      .await?;

    raw.into_token()
  }

  async fn list_tokens(&self, user_id: i64) -> Result<Vec<ApiToken>> {
    let raws: Vec<RawToken> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TOKEN_COLS} FROM api_tokens
           WHERE user_id = ?1 AND is_revoked = 0
           ORDER BY created_at DESC, id DESC"
        ))?;
        Ok(
          stmt
            .query_map(rusqlite::params![user_id], token_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        )
      })
      .await?;

    let now = Utc::now();
    let tokens = raws
      .into_iter()
      .map(RawToken::into_token)
      .collect::<Result<Vec<_>>>()?;
    Ok(tokens.into_iter().filter(|t| t.is_usable(now)).collect())
  }

  async fn revoke_token(&self, token_id: i64, user_id: i64) -> Result<bool> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE api_tokens SET is_revoked = 1
           WHERE id = ?1 AND user_id = ?2",
          rusqlite::params![token_id, user_id],
        )?)
      })
      .await?;
    Ok(affected > 0)
  }

  async fn resolve_token(&self, token: &str) -> Result<Option<i64>> {
    let token = token.to_owned();
    let raw: Option<RawToken> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TOKEN_COLS} FROM api_tokens WHERE token = ?1"),
              rusqlite::params![token],
              token_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    let Some(stored) = raw.map(RawToken::into_token).transpose()? else {
      return Ok(None);
    };

    let now = Utc::now();
    if !stored.is_usable(now) {
      return Ok(None);
    }

    let now_str = encode_dt(now);
    let id = stored.id;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE api_tokens SET last_used = ?1 WHERE id = ?2",
          rusqlite::params![now_str, id],
        )?;
        Ok(())
      })
      .await?;

    Ok(Some(stored.user_id))
  }
}
