//! Article repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide tenant-scoped article CRUD over canonical `articles` storage.
//! - Keep the full-text index in sync through schema triggers only.
//!
//! # Invariants
//! - Every query filters by `tenant_id`; reads skip soft-deleted rows.
//! - New articles must reference an active topic of the same tenant.

use crate::model::article::{Article, ArticleDraft, ArticleId, ARTICLE_TITLE_MAX_CHARS};
use crate::model::lifecycle::Lifecycle;
use crate::model::normalize_required_text;
use crate::model::tenant::TenantId;
use crate::model::topic::TopicId;
use crate::repo::schema::{ensure_connection_ready, parse_uuid};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const ARTICLE_SELECT_SQL: &str = "SELECT
    id,
    tenant_id,
    topic_id,
    title,
    content,
    created_at,
    deleted_at
FROM articles";

/// Repository interface for article operations.
pub trait ArticleRepository {
    /// Creates one article under an active topic of the tenant.
    fn create_article(&self, tenant_id: TenantId, draft: &ArticleDraft) -> RepoResult<Article>;
    /// Loads one active article.
    fn get_article(&self, tenant_id: TenantId, article_id: ArticleId)
        -> RepoResult<Option<Article>>;
    /// Lists active articles of a tenant in fetch order.
    fn list_articles(&self, tenant_id: TenantId) -> RepoResult<Vec<Article>>;
    /// Lists active articles attached to one topic in fetch order.
    fn list_articles_by_topic(
        &self,
        tenant_id: TenantId,
        topic_id: TopicId,
    ) -> RepoResult<Vec<Article>>;
    /// Replaces title and content of one active article.
    fn update_article(
        &self,
        tenant_id: TenantId,
        article_id: ArticleId,
        title: &str,
        content: &str,
    ) -> RepoResult<Article>;
    /// Soft-deletes one active article.
    fn soft_delete_article(&self, tenant_id: TenantId, article_id: ArticleId) -> RepoResult<()>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "articles",
            &[
                "id",
                "tenant_id",
                "topic_id",
                "title",
                "content",
                "created_at",
                "updated_at",
                "deleted_at",
            ],
        )?;
        Ok(Self { conn })
    }

    fn load_required_article(
        &self,
        tenant_id: TenantId,
        article_id: ArticleId,
    ) -> RepoResult<Article> {
        self.get_article(tenant_id, article_id)?
            .ok_or(RepoError::NotFound {
                entity: "article",
                id: article_id,
            })
    }

    fn query_articles(&self, sql: &str, bind: &[String]) -> RepoResult<Vec<Article>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind))?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(row)?);
        }
        Ok(articles)
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn create_article(&self, tenant_id: TenantId, draft: &ArticleDraft) -> RepoResult<Article> {
        let title = normalize_required_text(&draft.title, "article title", ARTICLE_TITLE_MAX_CHARS)?;

        let topic_exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1
                 FROM topics
                 WHERE id = ?1
                   AND tenant_id = ?2
                   AND deleted_at IS NULL;",
                [draft.topic_id.to_string(), tenant_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if topic_exists.is_none() {
            return Err(RepoError::TopicNotFound(draft.topic_id));
        }

        let article_id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO articles (
                id,
                tenant_id,
                topic_id,
                title,
                content
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                article_id.to_string(),
                tenant_id.to_string(),
                draft.topic_id.to_string(),
                title,
                draft.content,
            ],
        )?;
        self.load_required_article(tenant_id, article_id)
    }

    fn get_article(
        &self,
        tenant_id: TenantId,
        article_id: ArticleId,
    ) -> RepoResult<Option<Article>> {
        let sql = format!(
            "{ARTICLE_SELECT_SQL}
             WHERE id = ?1
               AND tenant_id = ?2
               AND deleted_at IS NULL;"
        );
        let mut articles =
            self.query_articles(&sql, &[article_id.to_string(), tenant_id.to_string()])?;
        Ok(articles.pop())
    }

    fn list_articles(&self, tenant_id: TenantId) -> RepoResult<Vec<Article>> {
        let sql = format!(
            "{ARTICLE_SELECT_SQL}
             WHERE tenant_id = ?1
               AND deleted_at IS NULL
             ORDER BY rowid ASC;"
        );
        self.query_articles(&sql, &[tenant_id.to_string()])
    }

    fn list_articles_by_topic(
        &self,
        tenant_id: TenantId,
        topic_id: TopicId,
    ) -> RepoResult<Vec<Article>> {
        let sql = format!(
            "{ARTICLE_SELECT_SQL}
             WHERE tenant_id = ?1
               AND topic_id = ?2
               AND deleted_at IS NULL
             ORDER BY rowid ASC;"
        );
        self.query_articles(&sql, &[tenant_id.to_string(), topic_id.to_string()])
    }

    fn update_article(
        &self,
        tenant_id: TenantId,
        article_id: ArticleId,
        title: &str,
        content: &str,
    ) -> RepoResult<Article> {
        let title = normalize_required_text(title, "article title", ARTICLE_TITLE_MAX_CHARS)?;
        let changed = self.conn.execute(
            "UPDATE articles
             SET title = ?3,
                 content = ?4,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND tenant_id = ?2
               AND deleted_at IS NULL;",
            params![article_id.to_string(), tenant_id.to_string(), title, content],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "article",
                id: article_id,
            });
        }
        self.load_required_article(tenant_id, article_id)
    }

    fn soft_delete_article(&self, tenant_id: TenantId, article_id: ArticleId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE articles
             SET deleted_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND tenant_id = ?2
               AND deleted_at IS NULL;",
            [article_id.to_string(), tenant_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "article",
                id: article_id,
            });
        }
        Ok(())
    }
}

pub(crate) fn parse_article_row(row: &Row<'_>) -> RepoResult<Article> {
    let id_text: String = row.get("id")?;
    let tenant_text: String = row.get("tenant_id")?;
    let topic_text: String = row.get("topic_id")?;

    Ok(Article {
        id: parse_uuid(&id_text, "articles.id")?,
        tenant_id: parse_uuid(&tenant_text, "articles.tenant_id")?,
        topic_id: parse_uuid(&topic_text, "articles.topic_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        lifecycle: Lifecycle::from_deleted_at(row.get("deleted_at")?),
    })
}
