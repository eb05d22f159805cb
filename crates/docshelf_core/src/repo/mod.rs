//! Repository layer: tenant-scoped, soft-delete-aware data access.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Every topic/article query carries a `tenant_id` predicate.
//! - Read paths only return rows with `deleted_at IS NULL`.
//! - Write paths validate drafts before SQL mutations.

pub mod article_repo;
pub mod error;
mod schema;
pub mod tenant_repo;
pub mod topic_repo;

pub use error::{RepoError, RepoResult};
