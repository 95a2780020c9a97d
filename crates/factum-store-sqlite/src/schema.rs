//! SQL schema for the Factum SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT,             -- argon2 PHC string; NULL for external sign-ins
    display_name  TEXT,
    created_at    TEXT NOT NULL     -- ISO 8601 UTC; store-assigned
);

CREATE TABLE IF NOT EXISTS facts (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    slug       TEXT NOT NULL UNIQUE,
    claim      TEXT NOT NULL,
    answer     TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'draft',  -- 'draft' | 'published'
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    slug       TEXT NOT NULL UNIQUE,
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'draft',
    author_id  INTEGER NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- At most one vote per (fact, user); revotes update the row in place.
-- Deleting a fact takes its votes with it.
CREATE TABLE IF NOT EXISTS votes (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    fact_id    INTEGER NOT NULL REFERENCES facts(id) ON DELETE CASCADE,
    user_id    INTEGER NOT NULL REFERENCES users(id),
    rating     TEXT NOT NULL,  -- 'helpful' | 'somewhat_helpful' | 'not_helpful'
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (fact_id, user_id)
);

-- Tokens are never deleted; revocation flips is_revoked so the audit
-- trail survives.
CREATE TABLE IF NOT EXISTS api_tokens (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    token      TEXT NOT NULL UNIQUE,
    user_id    INTEGER NOT NULL REFERENCES users(id),
    name       TEXT,
    created_at TEXT NOT NULL,
    expires_at TEXT,            -- NULL = never expires
    last_used  TEXT,
    is_revoked INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS facts_status_idx    ON facts(status, created_at);
CREATE INDEX IF NOT EXISTS posts_author_idx    ON posts(author_id);
CREATE INDEX IF NOT EXISTS votes_fact_idx      ON votes(fact_id);
CREATE INDEX IF NOT EXISTS api_tokens_user_idx ON api_tokens(user_id);

PRAGMA user_version = 1;
";
