//! Tenant-scoped search over topic names and article full text.
//!
//! # Responsibility
//! - Run the topic-name and article full-text sub-queries concurrently.
//! - Merge hits (topics first) and attach highlighted article excerpts.
//!
//! # See also
//! - `snippet` for excerpt shaping rules.

pub mod engine;
pub mod error;
pub mod snippet;
pub mod store;

pub use engine::{SearchEngine, SearchHit, SearchHitKind};
pub use error::{SearchError, SearchResult};
pub use snippet::{extract_snippet, strip_markup, SnippetOptions};
pub use store::{SearchStore, SqliteSearchStore};
