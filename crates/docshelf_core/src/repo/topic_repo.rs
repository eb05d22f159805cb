//! Topic repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide tenant-scoped topic CRUD and the tree projection fetch.
//! - Keep SQL details and fetch ordering inside the repository boundary.
//!
//! # Invariants
//! - Every query filters by `tenant_id` and `deleted_at IS NULL`.
//! - Listing order is fetch (insertion) order: `rowid ASC`.
//! - Writes only accept a parent that is an active topic of the same tenant;
//!   reads never re-validate parents.

use crate::model::article::ArticleStub;
use crate::model::lifecycle::Lifecycle;
use crate::model::normalize_required_text;
use crate::model::tenant::TenantId;
use crate::model::topic::{
    Topic, TopicDraft, TopicId, TopicTreeRecord, Visibility, VisibilityFilter,
    TOPIC_NAME_MAX_CHARS,
};
use crate::model::ValidationError;
use crate::repo::schema::{ensure_connection_ready, parse_optional_uuid, parse_uuid};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const TOPIC_SELECT_SQL: &str = "SELECT
    id,
    tenant_id,
    name,
    visibility,
    parent_id,
    sort_order,
    deleted_at
FROM topics";

/// Repository interface for topic operations.
pub trait TopicRepository {
    /// Creates one topic for a tenant.
    fn create_topic(&self, tenant_id: TenantId, draft: &TopicDraft) -> RepoResult<Topic>;
    /// Loads one active topic.
    fn get_topic(&self, tenant_id: TenantId, topic_id: TopicId) -> RepoResult<Option<Topic>>;
    /// Lists active topics matching a visibility filter, in fetch order.
    fn list_topics(&self, tenant_id: TenantId, filter: VisibilityFilter)
        -> RepoResult<Vec<Topic>>;
    /// Replaces name, visibility, parent and order of one active topic.
    fn update_topic(
        &self,
        tenant_id: TenantId,
        topic_id: TopicId,
        draft: &TopicDraft,
    ) -> RepoResult<Topic>;
    /// Changes only the visibility of one active topic.
    fn update_topic_visibility(
        &self,
        tenant_id: TenantId,
        topic_id: TopicId,
        visibility: Visibility,
    ) -> RepoResult<Topic>;
    /// Soft-deletes one active topic.
    fn soft_delete_topic(&self, tenant_id: TenantId, topic_id: TopicId) -> RepoResult<()>;
    /// Fetches active topics with their live `{id, title}` article stubs in
    /// one round trip, topics in fetch order.
    fn list_tree_records(
        &self,
        tenant_id: TenantId,
        filter: VisibilityFilter,
    ) -> RepoResult<Vec<TopicTreeRecord>>;
}

/// SQLite-backed topic repository.
pub struct SqliteTopicRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTopicRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "topics",
            &[
                "id",
                "tenant_id",
                "name",
                "visibility",
                "parent_id",
                "sort_order",
                "deleted_at",
            ],
        )?;
        ensure_connection_ready(conn, "articles", &["id", "tenant_id", "topic_id", "title"])?;
        Ok(Self { conn })
    }

    fn ensure_parent_in_tenant(
        &self,
        tenant_id: TenantId,
        topic_id: Option<TopicId>,
        parent_id: Option<TopicId>,
    ) -> RepoResult<()> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        if Some(parent_id) == topic_id {
            return Err(ValidationError::SelfParent(parent_id).into());
        }
        if self.get_topic(tenant_id, parent_id)?.is_none() {
            return Err(RepoError::TopicNotFound(parent_id));
        }
        Ok(())
    }

    fn load_required_topic(&self, tenant_id: TenantId, topic_id: TopicId) -> RepoResult<Topic> {
        self.get_topic(tenant_id, topic_id)?
            .ok_or(RepoError::NotFound {
                entity: "topic",
                id: topic_id,
            })
    }
}

impl TopicRepository for SqliteTopicRepository<'_> {
    fn create_topic(&self, tenant_id: TenantId, draft: &TopicDraft) -> RepoResult<Topic> {
        let name = normalize_required_text(&draft.name, "topic name", TOPIC_NAME_MAX_CHARS)?;
        self.ensure_parent_in_tenant(tenant_id, None, draft.parent_id)?;

        let topic_id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO topics (
                id,
                tenant_id,
                name,
                visibility,
                parent_id,
                sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                topic_id.to_string(),
                tenant_id.to_string(),
                name,
                draft.visibility.as_str(),
                draft.parent_id.map(|value| value.to_string()),
                draft.order,
            ],
        )?;
        self.load_required_topic(tenant_id, topic_id)
    }

    fn get_topic(&self, tenant_id: TenantId, topic_id: TopicId) -> RepoResult<Option<Topic>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TOPIC_SELECT_SQL}
             WHERE id = ?1
               AND tenant_id = ?2
               AND deleted_at IS NULL;"
        ))?;
        let mut rows = stmt.query([topic_id.to_string(), tenant_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_topic_row(row)?));
        }
        Ok(None)
    }

    fn list_topics(
        &self,
        tenant_id: TenantId,
        filter: VisibilityFilter,
    ) -> RepoResult<Vec<Topic>> {
        let mut sql = format!(
            "{TOPIC_SELECT_SQL}
             WHERE tenant_id = ?
               AND deleted_at IS NULL"
        );
        let mut bind_values: Vec<Value> = vec![Value::Text(tenant_id.to_string())];
        push_visibility_predicate(&mut sql, &mut bind_values, "visibility", filter);
        sql.push_str(" ORDER BY rowid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(parse_topic_row(row)?);
        }
        Ok(topics)
    }

    fn update_topic(
        &self,
        tenant_id: TenantId,
        topic_id: TopicId,
        draft: &TopicDraft,
    ) -> RepoResult<Topic> {
        let name = normalize_required_text(&draft.name, "topic name", TOPIC_NAME_MAX_CHARS)?;
        self.ensure_parent_in_tenant(tenant_id, Some(topic_id), draft.parent_id)?;

        let changed = self.conn.execute(
            "UPDATE topics
             SET name = ?3,
                 visibility = ?4,
                 parent_id = ?5,
                 sort_order = ?6
             WHERE id = ?1
               AND tenant_id = ?2
               AND deleted_at IS NULL;",
            params![
                topic_id.to_string(),
                tenant_id.to_string(),
                name,
                draft.visibility.as_str(),
                draft.parent_id.map(|value| value.to_string()),
                draft.order,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "topic",
                id: topic_id,
            });
        }
        self.load_required_topic(tenant_id, topic_id)
    }

    fn update_topic_visibility(
        &self,
        tenant_id: TenantId,
        topic_id: TopicId,
        visibility: Visibility,
    ) -> RepoResult<Topic> {
        let changed = self.conn.execute(
            "UPDATE topics
             SET visibility = ?3
             WHERE id = ?1
               AND tenant_id = ?2
               AND deleted_at IS NULL;",
            params![
                topic_id.to_string(),
                tenant_id.to_string(),
                visibility.as_str()
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "topic",
                id: topic_id,
            });
        }
        self.load_required_topic(tenant_id, topic_id)
    }

    fn soft_delete_topic(&self, tenant_id: TenantId, topic_id: TopicId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics
             SET deleted_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND tenant_id = ?2
               AND deleted_at IS NULL;",
            [topic_id.to_string(), tenant_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "topic",
                id: topic_id,
            });
        }
        Ok(())
    }

    fn list_tree_records(
        &self,
        tenant_id: TenantId,
        filter: VisibilityFilter,
    ) -> RepoResult<Vec<TopicTreeRecord>> {
        let mut sql = String::from(
            "SELECT
                t.id AS id,
                t.tenant_id AS tenant_id,
                t.name AS name,
                t.visibility AS visibility,
                t.parent_id AS parent_id,
                t.sort_order AS sort_order,
                t.deleted_at AS deleted_at,
                a.id AS article_id,
                a.title AS article_title
             FROM topics t
             LEFT JOIN articles a
               ON a.topic_id = t.id
              AND a.tenant_id = t.tenant_id
              AND a.deleted_at IS NULL
             WHERE t.tenant_id = ?
               AND t.deleted_at IS NULL",
        );
        let mut bind_values: Vec<Value> = vec![Value::Text(tenant_id.to_string())];
        push_visibility_predicate(&mut sql, &mut bind_values, "t.visibility", filter);
        sql.push_str(" ORDER BY t.rowid ASC, a.rowid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records: Vec<TopicTreeRecord> = Vec::new();
        while let Some(row) = rows.next()? {
            let topic = parse_topic_row(row)?;
            let stub = parse_article_stub(row)?;

            let continues_current = records
                .last()
                .is_some_and(|current| current.topic.id == topic.id);
            if continues_current {
                if let Some(current) = records.last_mut() {
                    current.articles.extend(stub);
                }
            } else {
                records.push(TopicTreeRecord {
                    topic,
                    articles: stub.into_iter().collect(),
                });
            }
        }
        Ok(records)
    }
}

fn push_visibility_predicate(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    column: &str,
    filter: VisibilityFilter,
) {
    if let VisibilityFilter::Only(visibility) = filter {
        sql.push_str(&format!(" AND {column} = ?"));
        bind_values.push(Value::Text(visibility.as_str().to_string()));
    }
}

pub(crate) fn parse_topic_row(row: &Row<'_>) -> RepoResult<Topic> {
    let id_text: String = row.get("id")?;
    let tenant_text: String = row.get("tenant_id")?;
    let visibility_text: String = row.get("visibility")?;
    let visibility = visibility_text.parse::<Visibility>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid visibility `{visibility_text}` in topics.visibility"
        ))
    })?;

    Ok(Topic {
        id: parse_uuid(&id_text, "topics.id")?,
        tenant_id: parse_uuid(&tenant_text, "topics.tenant_id")?,
        name: row.get("name")?,
        visibility,
        parent_id: parse_optional_uuid(row.get("parent_id")?, "topics.parent_id")?,
        order: row.get("sort_order")?,
        lifecycle: Lifecycle::from_deleted_at(row.get("deleted_at")?),
    })
}

fn parse_article_stub(row: &Row<'_>) -> RepoResult<Option<ArticleStub>> {
    let Some(id_text) = row.get::<_, Option<String>>("article_id")? else {
        return Ok(None);
    };
    Ok(Some(ArticleStub {
        id: parse_uuid(&id_text, "articles.id")?,
        title: row.get("article_title")?,
    }))
}
