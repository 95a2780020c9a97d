//! Core domain types for Factum — a fact-checking and blogging platform.
//!
//! This crate defines the entities (users, facts, posts, votes, API tokens),
//! the slug generator, and the [`store::ContentStore`] trait implemented by
//! storage backends. It contains no I/O.

pub mod content;
pub mod error;
pub mod slug;
pub mod store;
pub mod token;
pub mod user;
pub mod vote;

pub use error::{Error, Result};
