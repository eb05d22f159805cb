//! Edge-facing facade combining tenant resolution, caller context, topic
//! trees and search.
//!
//! # Responsibility
//! - Map a tenant slug plus caller context onto tree/search calls.
//! - Enforce that an authenticated caller only reads its own tenant.
//! - Serve single articles anonymously only when their topic is public.
//!
//! # Invariants
//! - Blank search text returns an empty list before the tenant is resolved.
//! - Credentials are trusted as given; no token validation happens here.

use crate::model::article::{Article, ArticleId};
use crate::model::parse_id;
use crate::model::tenant::{Tenant, TenantId};
use crate::model::topic::{TopicNode, Visibility, VisibilityFilter};
use crate::repo::article_repo::ArticleRepository;
use crate::repo::tenant_repo::TenantDirectory;
use crate::repo::topic_repo::TopicRepository;
use crate::repo::RepoError;
use crate::search::{SearchEngine, SearchError, SearchHit, SearchStore};
use crate::service::tree_service::{TopicTreeService, TreeServiceError};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller identity as supplied by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthContext {
    Anonymous,
    Authenticated { tenant_id: TenantId },
}

impl AuthContext {
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Errors surfaced to edge handlers.
#[derive(Debug)]
pub enum PortalError {
    /// Caller-supplied identifier is malformed.
    InvalidArgument(String),
    /// No tenant is registered under the slug.
    TenantNotFound(String),
    /// No live article with this id in the tenant.
    ArticleNotFound(ArticleId),
    /// Operation requires an authenticated caller.
    Unauthorized,
    /// Authenticated caller belongs to another tenant.
    Forbidden,
    Repo(RepoError),
    Tree(TreeServiceError),
    Search(SearchError),
}

impl Display for PortalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::TenantNotFound(slug) => write!(f, "tenant not found: {slug}"),
            Self::ArticleNotFound(id) => write!(f, "article not found: {id}"),
            Self::Unauthorized => write!(f, "authentication required"),
            Self::Forbidden => write!(f, "caller may not access this tenant"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Tree(err) => write!(f, "{err}"),
            Self::Search(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PortalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Tree(err) => Some(err),
            Self::Search(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PortalError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<TreeServiceError> for PortalError {
    fn from(value: TreeServiceError) -> Self {
        Self::Tree(value)
    }
}

impl From<SearchError> for PortalError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}

/// Documentation portal facade.
pub struct DocsPortal<D, R, A, S>
where
    D: TenantDirectory,
    R: TopicRepository,
    A: ArticleRepository,
    S: SearchStore,
{
    tenants: D,
    trees: TopicTreeService<R>,
    articles: A,
    search: SearchEngine<S>,
}

impl<D, R, A, S> DocsPortal<D, R, A, S>
where
    D: TenantDirectory,
    R: TopicRepository,
    A: ArticleRepository,
    S: SearchStore,
{
    pub fn new(
        tenants: D,
        trees: TopicTreeService<R>,
        articles: A,
        search: SearchEngine<S>,
    ) -> Self {
        Self {
            tenants,
            trees,
            articles,
            search,
        }
    }

    /// Public topic tree of the tenant behind `tenant_slug`.
    pub fn public_tree(&self, tenant_slug: &str) -> Result<Vec<TopicNode>, PortalError> {
        let tenant = self.resolve_tenant(tenant_slug)?;
        let tree = self.trees.build_tree(
            &tenant.id.to_string(),
            Visibility::Public.into(),
            false,
        )?;
        Ok(tree)
    }

    /// Private topic tree of the caller's own tenant.
    pub fn private_tree(&self, auth: AuthContext) -> Result<Vec<TopicNode>, PortalError> {
        let AuthContext::Authenticated { tenant_id } = auth else {
            return Err(PortalError::Unauthorized);
        };
        let tree = self.trees.build_tree(
            &tenant_id.to_string(),
            VisibilityFilter::Only(Visibility::Private),
            true,
        )?;
        Ok(tree)
    }

    /// Anonymous read of one article of the tenant behind `tenant_slug`.
    ///
    /// # Errors
    /// - `InvalidArgument` for a malformed `article_id`.
    /// - `TenantNotFound` / `ArticleNotFound` when either is absent.
    /// - `Unauthorized` when the article's topic is private or gone.
    pub fn public_article(
        &self,
        tenant_slug: &str,
        article_id: &str,
    ) -> Result<Article, PortalError> {
        let article_id = parse_id(article_id, "article_id")
            .map_err(|err| PortalError::InvalidArgument(err.to_string()))?;
        let tenant = self.resolve_tenant(tenant_slug)?;
        let article = self
            .articles
            .get_article(tenant.id, article_id)?
            .ok_or(PortalError::ArticleNotFound(article_id))?;

        let topic = self.trees.find_topic(tenant.id, article.topic_id)?;
        match topic {
            Some(topic) if topic.visibility == Visibility::Public => Ok(article),
            _ => {
                warn!(
                    "event=public_article module=portal status=rejected tenant_id={} article_id={} topic_id={}",
                    tenant.id, article.id, article.topic_id
                );
                Err(PortalError::Unauthorized)
            }
        }
    }

    /// Searches the tenant behind `tenant_slug` on behalf of `auth`.
    pub fn search(
        &self,
        tenant_slug: &str,
        text: &str,
        auth: AuthContext,
    ) -> Result<Vec<SearchHit>, PortalError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let tenant = self.resolve_tenant(tenant_slug)?;
        if let AuthContext::Authenticated { tenant_id } = auth {
            if tenant_id != tenant.id {
                warn!(
                    "event=search_forbidden module=portal status=rejected tenant_id={} caller_tenant_id={}",
                    tenant.id, tenant_id
                );
                return Err(PortalError::Forbidden);
            }
        }

        let hits = self
            .search
            .search(text, &tenant.id.to_string(), auth.is_authenticated())?;
        Ok(hits)
    }

    fn resolve_tenant(&self, tenant_slug: &str) -> Result<Tenant, PortalError> {
        self.tenants
            .find_by_slug(tenant_slug)?
            .ok_or_else(|| PortalError::TenantNotFound(tenant_slug.to_string()))
    }
}
