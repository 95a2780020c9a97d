//! SQLite backend for the Factum content store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Uniqueness invariants
//! (slugs, emails, one vote per (fact, user), token strings) are declared
//! as UNIQUE constraints in the schema, not checked in application code.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
