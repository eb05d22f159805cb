//! Search sub-query contracts and SQLite FTS5 implementation.
//!
//! # Responsibility
//! - Provide the two tenant-scoped sub-queries used by [`super::SearchEngine`].
//! - Keep FTS5 match-expression building and error mapping inside core.
//!
//! # Invariants
//! - Only live rows of the requested tenant are returned.
//! - Topic names match as case-insensitive literal substrings.
//! - Articles match through the stemmed `articles_fts` index; any query term
//!   may match.
//! - Results are in fetch (insertion) order; no relevance ranking.

use crate::db::{open_db_reader, DbError};
use crate::model::article::Article;
use crate::model::tenant::TenantId;
use crate::model::topic::{Topic, VisibilityFilter};
use crate::repo::article_repo::parse_article_row;
use crate::repo::topic_repo::parse_topic_row;
use crate::search::{SearchError, SearchResult};
use regex::{Regex, RegexBuilder};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::PathBuf;

/// Datastore contract consumed by the search engine.
///
/// Implementations must be shareable across threads: both sub-queries run
/// concurrently against the same store.
pub trait SearchStore: Sync {
    /// Live topics of `tenant_id` whose name contains `text`, case-insensitively.
    fn match_topics_by_name(
        &self,
        tenant_id: TenantId,
        text: &str,
        filter: VisibilityFilter,
    ) -> SearchResult<Vec<Topic>>;

    /// Live articles of `tenant_id` whose title/content full-text match `text`.
    fn match_articles_full_text(&self, tenant_id: TenantId, text: &str)
        -> SearchResult<Vec<Article>>;
}

/// SQLite-backed search store.
///
/// Opens one read-only connection per sub-query so sub-queries never share a
/// connection.
#[derive(Debug, Clone)]
pub struct SqliteSearchStore {
    db_path: PathBuf,
}

impl SqliteSearchStore {
    /// Creates a store over an already migrated database file.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    fn connect(&self) -> SearchResult<Connection> {
        open_db_reader(&self.db_path).map_err(SearchError::from)
    }
}

impl SearchStore for SqliteSearchStore {
    fn match_topics_by_name(
        &self,
        tenant_id: TenantId,
        text: &str,
        filter: VisibilityFilter,
    ) -> SearchResult<Vec<Topic>> {
        let matcher = name_matcher(text)?;
        let conn = self.connect()?;

        let mut sql = String::from(
            "SELECT
                id,
                tenant_id,
                name,
                visibility,
                parent_id,
                sort_order,
                deleted_at
             FROM topics
             WHERE tenant_id = ?
               AND deleted_at IS NULL",
        );
        let mut bind_values: Vec<Value> = vec![Value::Text(tenant_id.to_string())];
        if let VisibilityFilter::Only(visibility) = filter {
            sql.push_str(" AND visibility = ?");
            bind_values.push(Value::Text(visibility.as_str().to_string()));
        }
        sql.push_str(" ORDER BY rowid ASC;");

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            let topic = parse_topic_row(row)?;
            if matcher.is_match(&topic.name) {
                topics.push(topic);
            }
        }
        Ok(topics)
    }

    fn match_articles_full_text(
        &self,
        tenant_id: TenantId,
        text: &str,
    ) -> SearchResult<Vec<Article>> {
        let Some(match_expr) = build_match_expression(text) else {
            return Ok(Vec::new());
        };
        let conn = self.connect()?;
        let tenant_text = tenant_id.to_string();

        let mut stmt = conn.prepare(
            "SELECT
                articles.id AS id,
                articles.tenant_id AS tenant_id,
                articles.topic_id AS topic_id,
                articles.title AS title,
                articles.content AS content,
                articles.created_at AS created_at,
                articles.deleted_at AS deleted_at
             FROM articles_fts
             JOIN articles ON articles.rowid = articles_fts.rowid
             WHERE articles_fts MATCH ?1
               AND articles.tenant_id = ?2
               AND articles.deleted_at IS NULL
             ORDER BY articles.rowid ASC;",
        )?;
        let mut rows = stmt
            .query([match_expr.as_str(), tenant_text.as_str()])
            .map_err(|err| map_query_error(err, &match_expr))?;

        let mut articles = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|err| map_query_error(err, &match_expr))?
        {
            articles.push(parse_article_row(row)?);
        }
        Ok(articles)
    }
}

fn name_matcher(text: &str) -> SearchResult<Regex> {
    RegexBuilder::new(&regex::escape(text))
        .case_insensitive(true)
        .build()
        .map_err(|err| SearchError::InvalidQuery {
            query: text.to_string(),
            message: err.to_string(),
        })
}

/// Builds an FTS5 expression where each whitespace-separated term is quoted
/// and any term may match. Returns `None` for blank text.
fn build_match_expression(text: &str) -> Option<String> {
    let terms = text
        .split_whitespace()
        .map(escape_fts_term)
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return None;
    }

    Some(terms.join(" OR "))
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

fn map_query_error(err: rusqlite::Error, query: &str) -> SearchError {
    if is_match_syntax_error(&err) {
        return SearchError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        };
    }

    SearchError::Db(DbError::Sqlite(err))
}

fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
        }
        _ => false,
    }
}
