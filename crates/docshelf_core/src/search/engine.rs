//! Search orchestration.
//!
//! # Responsibility
//! - Short-circuit blank queries without touching storage.
//! - Fan out the topic and article sub-queries and join them before merging.
//! - Attach excerpts to article hits.
//!
//! # Invariants
//! - Either sub-query failing fails the whole search; no partial results.
//! - Merge order: all topic hits in fetch order, then all article hits.
//! - Anonymous callers only see articles whose topic is in the set of
//!   topics matched *by name* in the same search. An article under a public
//!   topic whose name does not match the query is therefore not returned to
//!   anonymous callers.

use crate::model::article::Article;
use crate::model::parse_id;
use crate::model::topic::{Topic, Visibility, VisibilityFilter};
use crate::search::snippet::{extract_snippet, SnippetOptions};
use crate::search::store::SearchStore;
use crate::search::{SearchError, SearchResult};
use log::{error, info};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use uuid::Uuid;

/// Kind of record a search hit points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchHitKind {
    Topic,
    Article,
}

/// Single search hit returned by [`SearchEngine::search`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: Uuid,
    /// Topic name or article title.
    pub label: String,
    pub kind: SearchHitKind,
    /// Highlighted excerpt; only article hits carry one, and it may be absent.
    pub snippet: Option<String>,
}

impl SearchHit {
    fn from_topic(topic: Topic) -> Self {
        Self {
            id: topic.id,
            label: topic.name,
            kind: SearchHitKind::Topic,
            snippet: None,
        }
    }

    fn from_article(article: Article, snippet: Option<String>) -> Self {
        Self {
            id: article.id,
            label: article.title,
            kind: SearchHitKind::Article,
            snippet,
        }
    }
}

/// Stateless search facade over a [`SearchStore`].
pub struct SearchEngine<S: SearchStore> {
    store: S,
    snippet_options: SnippetOptions,
}

impl<S: SearchStore> SearchEngine<S> {
    /// Creates an engine with default excerpt options.
    pub fn new(store: S) -> Self {
        Self::with_snippet_options(store, SnippetOptions::default())
    }

    pub fn with_snippet_options(store: S, snippet_options: SnippetOptions) -> Self {
        Self {
            store,
            snippet_options,
        }
    }

    /// Searches topic names and article full text of one tenant.
    ///
    /// Returns an empty list for blank queries without validating `tenant_id`
    /// or touching storage.
    ///
    /// # Errors
    /// - `SearchError::InvalidArgument` when `tenant_id` is malformed.
    /// - Any sub-query failure, unchanged.
    pub fn search(
        &self,
        query_text: &str,
        tenant_id: &str,
        is_authenticated: bool,
    ) -> SearchResult<Vec<SearchHit>> {
        if query_text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let tenant_id = parse_id(tenant_id, "tenant_id")
            .map_err(|err| SearchError::InvalidArgument(err.to_string()))?;

        let started_at = Instant::now();
        let topic_filter = if is_authenticated {
            VisibilityFilter::All
        } else {
            VisibilityFilter::Only(Visibility::Public)
        };

        let (topics, articles) = rayon::join(
            || {
                self.store
                    .match_topics_by_name(tenant_id, query_text, topic_filter)
            },
            || self.store.match_articles_full_text(tenant_id, query_text),
        );
        let (topics, articles) = match (topics, articles) {
            (Ok(topics), Ok(articles)) => (topics, articles),
            (Err(err), _) | (_, Err(err)) => {
                error!(
                    "event=search module=search status=error tenant_id={} query_len={} duration_ms={} error={}",
                    tenant_id,
                    query_text.chars().count(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        let topics: Vec<Topic> = topics
            .into_iter()
            .filter(|topic| {
                topic.tenant_id == tenant_id
                    && topic.lifecycle.is_live()
                    && topic_filter.admits(topic.visibility)
            })
            .collect();
        let articles: Vec<Article> = articles
            .into_iter()
            .filter(|article| article.tenant_id == tenant_id && article.lifecycle.is_live())
            .collect();
        let articles = if is_authenticated {
            articles
        } else {
            restrict_to_matched_topics(&topics, articles)
        };

        let topic_hits = topics.len();
        let article_hits = articles.len();
        let mut hits = Vec::with_capacity(topic_hits + article_hits);
        hits.extend(topics.into_iter().map(SearchHit::from_topic));
        hits.extend(articles.into_iter().map(|article| {
            let snippet = extract_snippet(&article.content, query_text, &self.snippet_options);
            SearchHit::from_article(article, snippet)
        }));

        info!(
            "event=search module=search status=ok tenant_id={} authenticated={} query_len={} topic_hits={} article_hits={} duration_ms={}",
            tenant_id,
            is_authenticated,
            query_text.chars().count(),
            topic_hits,
            article_hits,
            started_at.elapsed().as_millis()
        );
        Ok(hits)
    }
}

/// Keeps articles whose topic was itself matched by name in this search.
fn restrict_to_matched_topics(topics: &[Topic], articles: Vec<Article>) -> Vec<Article> {
    let matched_topic_ids: HashSet<Uuid> = topics.iter().map(|topic| topic.id).collect();
    articles
        .into_iter()
        .filter(|article| matched_topic_ids.contains(&article.topic_id))
        .collect()
}
