//! Article domain model.

use crate::model::lifecycle::Lifecycle;
use crate::model::tenant::TenantId;
use crate::model::topic::TopicId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable article identifier.
pub type ArticleId = Uuid;

/// Maximum article title length in characters.
pub const ARTICLE_TITLE_MAX_CHARS: usize = 200;

/// Persisted article record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub tenant_id: TenantId,
    pub topic_id: TopicId,
    pub title: String,
    /// Markup-bearing body (HTML from the editor).
    pub content: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    pub lifecycle: Lifecycle,
}

/// `{id, title}` projection embedded in topic tree nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleStub {
    pub id: ArticleId,
    pub title: String,
}

/// Write input for creating an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    pub topic_id: TopicId,
    pub title: String,
    pub content: String,
}

impl ArticleDraft {
    pub fn new(topic_id: TopicId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            topic_id,
            title: title.into(),
            content: content.into(),
        }
    }
}
