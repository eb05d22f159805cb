//! Core domain logic for Docshelf, a multi-tenant documentation portal.
//! This crate is the single source of truth for tree, search and visibility
//! rules; the CLI and any edge layer only translate inputs and outputs.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::article::{Article, ArticleDraft, ArticleId, ArticleStub};
pub use model::lifecycle::Lifecycle;
pub use model::tenant::{Tenant, TenantId};
pub use model::topic::{Topic, TopicDraft, TopicId, TopicNode, Visibility, VisibilityFilter};
pub use model::{parse_id, InvalidIdError, ValidationError};
pub use repo::article_repo::{ArticleRepository, SqliteArticleRepository};
pub use repo::tenant_repo::{SqliteTenantRepository, TenantDirectory};
pub use repo::topic_repo::{SqliteTopicRepository, TopicRepository};
pub use repo::{RepoError, RepoResult};
pub use search::{
    extract_snippet, SearchEngine, SearchError, SearchHit, SearchHitKind, SearchResult,
    SearchStore, SnippetOptions, SqliteSearchStore,
};
pub use service::portal_service::{AuthContext, DocsPortal, PortalError};
pub use service::tree_service::{assemble_forest, TopicTreeService, TreeServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
