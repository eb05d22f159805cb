//! Topic tree use-case service.
//!
//! # Responsibility
//! - Resolve the effective visibility filter for a caller.
//! - Assemble a tenant's flat topic records into an ordered forest.
//!
//! # Invariants
//! - A node is attached under its parent only when the parent is part of the
//!   same fetch; otherwise (filtered out, soft-deleted, other tenant, missing,
//!   or itself) it is a root.
//! - Only the root list is sorted, by `order` ascending (stable). Children
//!   keep fetch order.
//! - Assembly is iterative: no recursion depth limit applies, and members of
//!   a parent cycle (not reachable from any root) are left out instead of
//!   looping.

use crate::model::parse_id;
use crate::model::tenant::TenantId;
use crate::model::topic::{Topic, TopicId, TopicNode, TopicTreeRecord, VisibilityFilter};
use crate::repo::topic_repo::TopicRepository;
use crate::repo::RepoError;
use log::{error, info};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from topic tree service operations.
#[derive(Debug)]
pub enum TreeServiceError {
    /// Caller-supplied identifier is malformed.
    InvalidArgument(String),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for TreeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TreeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidArgument(_) => None,
        }
    }
}

impl From<RepoError> for TreeServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Topic tree service facade.
pub struct TopicTreeService<R: TopicRepository> {
    repo: R,
}

impl<R: TopicRepository> TopicTreeService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Builds the ordered topic forest of one tenant.
    ///
    /// Anonymous callers always get `public` topics; authenticated callers get
    /// `requested` verbatim, including [`VisibilityFilter::All`].
    /// A tenant without matching topics yields an empty forest.
    pub fn build_tree(
        &self,
        tenant_id: &str,
        requested: VisibilityFilter,
        is_authenticated: bool,
    ) -> Result<Vec<TopicNode>, TreeServiceError> {
        let tenant_id = parse_id(tenant_id, "tenant_id")
            .map_err(|err| TreeServiceError::InvalidArgument(err.to_string()))?;
        let filter = VisibilityFilter::resolve(requested, is_authenticated);
        let started_at = Instant::now();

        let records = match self.repo.list_tree_records(tenant_id, filter) {
            Ok(records) => records,
            Err(err) => {
                error!(
                    "event=topic_tree module=tree status=error tenant_id={} duration_ms={} error={}",
                    tenant_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };
        let live_records: Vec<TopicTreeRecord> = records
            .into_iter()
            .filter(|record| {
                record.topic.tenant_id == tenant_id
                    && record.topic.lifecycle.is_live()
                    && filter.admits(record.topic.visibility)
            })
            .collect();
        let topic_count = live_records.len();
        let forest = assemble_forest(live_records);

        info!(
            "event=topic_tree module=tree status=ok tenant_id={} filter={:?} topics={} roots={} duration_ms={}",
            tenant_id,
            filter,
            topic_count,
            forest.len(),
            started_at.elapsed().as_millis()
        );
        Ok(forest)
    }

    /// Loads one active topic of the tenant, regardless of visibility.
    pub fn find_topic(
        &self,
        tenant_id: TenantId,
        topic_id: TopicId,
    ) -> Result<Option<Topic>, TreeServiceError> {
        Ok(self.repo.get_topic(tenant_id, topic_id)?)
    }
}

/// Assembles fetched records into a forest.
///
/// Records are arena slots addressed by fetch index; parent links are
/// resolved through an id index built in one pass.
pub fn assemble_forest(records: Vec<TopicTreeRecord>) -> Vec<TopicNode> {
    let index_by_id: HashMap<TopicId, usize> = records
        .iter()
        .enumerate()
        .map(|(index, record)| (record.topic.id, index))
        .collect();

    let mut child_slots: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut root_slots: Vec<usize> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let parent_index = record
            .topic
            .parent_id
            .filter(|parent_id| *parent_id != record.topic.id)
            .and_then(|parent_id| index_by_id.get(&parent_id).copied())
            .filter(|parent_index| *parent_index != index);
        match parent_index {
            Some(parent_index) => child_slots[parent_index].push(index),
            None => root_slots.push(index),
        }
    }

    // Pre-order from the roots; reversing it yields children before parents.
    let mut visit_order = Vec::with_capacity(records.len());
    let mut stack: Vec<usize> = root_slots.iter().rev().copied().collect();
    while let Some(index) = stack.pop() {
        visit_order.push(index);
        stack.extend(child_slots[index].iter().rev().copied());
    }

    let mut slots: Vec<Option<TopicNode>> = records
        .into_iter()
        .map(|record| Some(TopicNode::from(record)))
        .collect();
    for &index in visit_order.iter().rev() {
        let children: Vec<TopicNode> = std::mem::take(&mut child_slots[index])
            .into_iter()
            .filter_map(|child| slots[child].take())
            .collect();
        if let Some(node) = slots[index].as_mut() {
            node.children = children;
        }
    }

    let mut roots: Vec<TopicNode> = root_slots
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect();
    roots.sort_by_key(|node| node.order);
    roots
}

#[cfg(test)]
mod tests {
    use super::assemble_forest;
    use crate::model::article::ArticleStub;
    use crate::model::lifecycle::Lifecycle;
    use crate::model::topic::{Topic, TopicId, TopicTreeRecord, Visibility};
    use uuid::Uuid;

    fn record(id: TopicId, parent_id: Option<TopicId>, order: i64) -> TopicTreeRecord {
        TopicTreeRecord {
            topic: Topic {
                id,
                tenant_id: Uuid::nil(),
                name: format!("topic-{order}"),
                visibility: Visibility::Public,
                parent_id,
                order,
                lifecycle: Lifecycle::Active,
            },
            articles: Vec::new(),
        }
    }

    #[test]
    fn roots_sorted_by_order_children_keep_fetch_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let child_high = Uuid::new_v4();
        let child_low = Uuid::new_v4();

        let forest = assemble_forest(vec![
            record(a, None, 2),
            record(b, None, 1),
            record(child_high, Some(a), 5),
            record(child_low, Some(a), 1),
        ]);

        let root_ids: Vec<_> = forest.iter().map(|node| node.id).collect();
        assert_eq!(root_ids, vec![b, a]);
        let child_orders: Vec<_> = forest[1].children.iter().map(|node| node.order).collect();
        assert_eq!(child_orders, vec![5, 1]);
    }

    #[test]
    fn child_fetched_before_parent_is_still_nested() {
        let parent = Uuid::new_v4();
        let child = Uuid::new_v4();
        let grandchild = Uuid::new_v4();

        let forest = assemble_forest(vec![
            record(grandchild, Some(child), 0),
            record(child, Some(parent), 0),
            record(parent, None, 0),
        ]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, parent);
        assert_eq!(forest[0].children[0].id, child);
        assert_eq!(forest[0].children[0].children[0].id, grandchild);
    }

    #[test]
    fn missing_or_self_parent_becomes_root() {
        let orphan = Uuid::new_v4();
        let selfish = Uuid::new_v4();

        let forest = assemble_forest(vec![
            record(orphan, Some(Uuid::new_v4()), 1),
            record(selfish, Some(selfish), 0),
        ]);

        let root_ids: Vec<_> = forest.iter().map(|node| node.id).collect();
        assert_eq!(root_ids, vec![selfish, orphan]);
    }

    #[test]
    fn parent_cycle_does_not_hang_or_panic() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let root = Uuid::new_v4();

        let forest = assemble_forest(vec![
            record(a, Some(b), 0),
            record(b, Some(a), 0),
            record(root, None, 0),
        ]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, root);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn equal_root_orders_keep_fetch_order() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let forest = assemble_forest(vec![record(first, None, 0), record(second, None, 0)]);
        assert_eq!(forest[0].id, first);
        assert_eq!(forest[1].id, second);
    }

    #[test]
    fn article_stubs_travel_with_their_node() {
        let topic = Uuid::new_v4();
        let mut with_articles = record(topic, None, 0);
        with_articles.articles = vec![ArticleStub {
            id: Uuid::new_v4(),
            title: "Getting started".to_string(),
        }];

        let forest = assemble_forest(vec![with_articles]);
        assert_eq!(forest[0].articles.len(), 1);
        assert_eq!(forest[0].articles[0].title, "Getting started");
    }

    #[test]
    fn empty_input_yields_empty_forest() {
        assert!(assemble_forest(Vec::new()).is_empty());
    }
}
