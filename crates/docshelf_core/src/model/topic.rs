//! Topic domain model and tree read model.
//!
//! # Invariants
//! - `order` places a node among the roots only; children keep fetch order.
//! - `parent_id` is not verified on read; a missing/foreign parent makes the
//!   node a root.

use crate::model::article::ArticleStub;
use crate::model::lifecycle::Lifecycle;
use crate::model::tenant::TenantId;
use crate::model::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable topic identifier.
pub type TopicId = Uuid;

/// Maximum topic name length in characters.
pub const TOPIC_NAME_MAX_CHARS: usize = 100;

/// Who may see a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to unauthenticated callers.
    Public,
    /// Authenticated callers only.
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(ValidationError::UnknownVisibility(other.to_string())),
        }
    }
}

/// Visibility predicate applied to topic reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityFilter {
    /// No visibility predicate.
    All,
    Only(Visibility),
}

impl VisibilityFilter {
    /// Effective filter for a caller: anonymous callers only ever see public topics.
    pub fn resolve(requested: VisibilityFilter, is_authenticated: bool) -> Self {
        if is_authenticated {
            requested
        } else {
            Self::Only(Visibility::Public)
        }
    }

    pub fn admits(self, visibility: Visibility) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == visibility,
        }
    }
}

impl From<Visibility> for VisibilityFilter {
    fn from(value: Visibility) -> Self {
        Self::Only(value)
    }
}

impl FromStr for VisibilityFilter {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed.parse::<Visibility>().map(Self::Only)
    }
}

/// Persisted topic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub tenant_id: TenantId,
    pub name: String,
    pub visibility: Visibility,
    pub parent_id: Option<TopicId>,
    pub order: i64,
    pub lifecycle: Lifecycle,
}

/// Write input for creating or replacing a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDraft {
    pub name: String,
    pub visibility: Visibility,
    pub parent_id: Option<TopicId>,
    pub order: i64,
}

impl TopicDraft {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
            parent_id: None,
            order: 0,
        }
    }

    pub fn with_parent(mut self, parent_id: TopicId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }
}

/// One fetched topic annotated with its live article stubs, in fetch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicTreeRecord {
    pub topic: Topic,
    pub articles: Vec<ArticleStub>,
}

/// Derived tree node returned by topic tree assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicNode {
    pub id: TopicId,
    pub tenant_id: TenantId,
    pub name: String,
    pub visibility: Visibility,
    pub parent_id: Option<TopicId>,
    pub order: i64,
    pub articles: Vec<ArticleStub>,
    pub children: Vec<TopicNode>,
}

impl From<TopicTreeRecord> for TopicNode {
    fn from(record: TopicTreeRecord) -> Self {
        let TopicTreeRecord { topic, articles } = record;
        Self {
            id: topic.id,
            tenant_id: topic.tenant_id,
            name: topic.name,
            visibility: topic.visibility,
            parent_id: topic.parent_id,
            order: topic.order,
            articles,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Visibility, VisibilityFilter};

    #[test]
    fn anonymous_callers_are_forced_to_public() {
        assert_eq!(
            VisibilityFilter::resolve(VisibilityFilter::All, false),
            VisibilityFilter::Only(Visibility::Public)
        );
        assert_eq!(
            VisibilityFilter::resolve(Visibility::Private.into(), false),
            VisibilityFilter::Only(Visibility::Public)
        );
        assert_eq!(
            VisibilityFilter::resolve(VisibilityFilter::All, true),
            VisibilityFilter::All
        );
    }

    #[test]
    fn filter_parses_sentinel_and_values() {
        assert_eq!("".parse::<VisibilityFilter>().unwrap(), VisibilityFilter::All);
        assert_eq!("ALL".parse::<VisibilityFilter>().unwrap(), VisibilityFilter::All);
        assert_eq!(
            " Private ".parse::<VisibilityFilter>().unwrap(),
            VisibilityFilter::Only(Visibility::Private)
        );
        assert!("secret".parse::<VisibilityFilter>().is_err());
    }

    #[test]
    fn admits_matches_only_the_selected_visibility() {
        assert!(VisibilityFilter::All.admits(Visibility::Private));
        assert!(VisibilityFilter::Only(Visibility::Public).admits(Visibility::Public));
        assert!(!VisibilityFilter::Only(Visibility::Public).admits(Visibility::Private));
    }
}
