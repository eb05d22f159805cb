use docshelf_core::db::open_db;
use docshelf_core::{
    ArticleDraft, ArticleRepository, AuthContext, DocsPortal, PortalError, SearchEngine,
    SearchHitKind, SqliteArticleRepository, SqliteSearchStore, SqliteTenantRepository,
    SqliteTopicRepository, TenantId, TopicDraft, TopicRepository, TopicTreeService, Visibility,
};
use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

fn seed(dir: &TempDir) -> (Connection, TenantId, TenantId) {
    let conn = open_db(dir.path().join("docshelf.db")).unwrap();
    let (acme, globex) = {
        let tenants = SqliteTenantRepository::try_new(&conn).unwrap();
        let topics = SqliteTopicRepository::try_new(&conn).unwrap();
        let articles = SqliteArticleRepository::try_new(&conn).unwrap();

        let acme = tenants.create_tenant("acme", "Acme").unwrap().id;
        let globex = tenants.create_tenant("globex", "Globex").unwrap().id;
        let public = topics
            .create_topic(acme, &TopicDraft::new("Guides", Visibility::Public))
            .unwrap();
        topics
            .create_topic(acme, &TopicDraft::new("Runbooks", Visibility::Private))
            .unwrap();
        articles
            .create_article(acme, &ArticleDraft::new(public.id, "Guides intro", "Read these guides"))
            .unwrap();
        (acme, globex)
    };
    (conn, acme, globex)
}

type SqlitePortal<'conn> = DocsPortal<
    SqliteTenantRepository<'conn>,
    SqliteTopicRepository<'conn>,
    SqliteArticleRepository<'conn>,
    SqliteSearchStore,
>;

fn portal<'conn>(conn: &'conn Connection, db_path: &Path) -> SqlitePortal<'conn> {
    DocsPortal::new(
        SqliteTenantRepository::try_new(conn).unwrap(),
        TopicTreeService::new(SqliteTopicRepository::try_new(conn).unwrap()),
        SqliteArticleRepository::try_new(conn).unwrap(),
        SearchEngine::new(SqliteSearchStore::new(db_path)),
    )
}

#[test]
fn public_tree_resolves_slug_and_shows_public_topics() {
    let dir = tempfile::tempdir().unwrap();
    let (conn, _, _) = seed(&dir);
    let portal = portal(&conn, &dir.path().join("docshelf.db"));

    let tree = portal.public_tree("ACME").unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].name, "Guides");
    assert_eq!(tree[0].articles[0].title, "Guides intro");

    let err = portal.public_tree("initech").unwrap_err();
    assert!(matches!(err, PortalError::TenantNotFound(slug) if slug == "initech"));
}

#[test]
fn private_tree_requires_authentication() {
    let dir = tempfile::tempdir().unwrap();
    let (conn, acme, _) = seed(&dir);
    let portal = portal(&conn, &dir.path().join("docshelf.db"));

    assert!(matches!(
        portal.private_tree(AuthContext::Anonymous),
        Err(PortalError::Unauthorized)
    ));

    let tree = portal
        .private_tree(AuthContext::Authenticated { tenant_id: acme })
        .unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].name, "Runbooks");
}

#[test]
fn search_checks_caller_tenant() {
    let dir = tempfile::tempdir().unwrap();
    let (conn, acme, globex) = seed(&dir);
    let portal = portal(&conn, &dir.path().join("docshelf.db"));

    let anonymous = portal
        .search("acme", "guides", AuthContext::Anonymous)
        .unwrap();
    assert_eq!(anonymous.len(), 2);
    assert_eq!(anonymous[0].kind, SearchHitKind::Topic);
    assert_eq!(anonymous[1].kind, SearchHitKind::Article);

    let member = portal
        .search("acme", "runbooks", AuthContext::Authenticated { tenant_id: acme })
        .unwrap();
    assert_eq!(member.len(), 1);
    assert_eq!(member[0].label, "Runbooks");

    let outsider = portal
        .search("acme", "guides", AuthContext::Authenticated { tenant_id: globex })
        .unwrap_err();
    assert!(matches!(outsider, PortalError::Forbidden));
}

#[test]
fn blank_search_short_circuits_before_tenant_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let (conn, _, _) = seed(&dir);
    let portal = portal(&conn, &dir.path().join("docshelf.db"));

    assert!(portal
        .search("no-such-tenant", "  ", AuthContext::Anonymous)
        .unwrap()
        .is_empty());
    assert!(matches!(
        portal.search("no-such-tenant", "guides", AuthContext::Anonymous),
        Err(PortalError::TenantNotFound(_))
    ));
}

#[test]
fn public_article_is_served_only_under_public_topic() {
    let dir = tempfile::tempdir().unwrap();
    let (conn, acme, _) = seed(&dir);
    let topics = SqliteTopicRepository::try_new(&conn).unwrap();
    let articles = SqliteArticleRepository::try_new(&conn).unwrap();
    let public_topic = topics
        .create_topic(acme, &TopicDraft::new("FAQ", Visibility::Public))
        .unwrap();
    let private_topic = topics
        .create_topic(acme, &TopicDraft::new("Ops", Visibility::Private))
        .unwrap();
    let open = articles
        .create_article(acme, &ArticleDraft::new(public_topic.id, "Billing", "Ask us"))
        .unwrap();
    let hidden = articles
        .create_article(acme, &ArticleDraft::new(private_topic.id, "Pager", "On call"))
        .unwrap();
    let portal = portal(&conn, &dir.path().join("docshelf.db"));

    let served = portal.public_article("acme", &open.id.to_string()).unwrap();
    assert_eq!(served, open);

    let err = portal
        .public_article("acme", &hidden.id.to_string())
        .unwrap_err();
    assert!(matches!(err, PortalError::Unauthorized));
}

#[test]
fn public_article_with_deleted_topic_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let (conn, acme, _) = seed(&dir);
    let topics = SqliteTopicRepository::try_new(&conn).unwrap();
    let topic = topics
        .create_topic(acme, &TopicDraft::new("Legacy", Visibility::Public))
        .unwrap();
    let article = SqliteArticleRepository::try_new(&conn)
        .unwrap()
        .create_article(acme, &ArticleDraft::new(topic.id, "Old", "text"))
        .unwrap();
    topics.soft_delete_topic(acme, topic.id).unwrap();
    let portal = portal(&conn, &dir.path().join("docshelf.db"));

    assert!(matches!(
        portal.public_article("acme", &article.id.to_string()),
        Err(PortalError::Unauthorized)
    ));
}

#[test]
fn public_article_rejects_bad_ids_and_unknown_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (conn, acme, _) = seed(&dir);
    let topic = SqliteTopicRepository::try_new(&conn)
        .unwrap()
        .create_topic(acme, &TopicDraft::new("FAQ", Visibility::Public))
        .unwrap();
    let article = SqliteArticleRepository::try_new(&conn)
        .unwrap()
        .create_article(acme, &ArticleDraft::new(topic.id, "Billing", "Ask us"))
        .unwrap();
    let portal = portal(&conn, &dir.path().join("docshelf.db"));

    assert!(matches!(
        portal.public_article("acme", "not-a-uuid"),
        Err(PortalError::InvalidArgument(_))
    ));

    let missing = uuid::Uuid::new_v4();
    assert!(matches!(
        portal.public_article("acme", &missing.to_string()),
        Err(PortalError::ArticleNotFound(id)) if id == missing
    ));

    // Another tenant's slug cannot reach it.
    assert!(matches!(
        portal.public_article("globex", &article.id.to_string()),
        Err(PortalError::ArticleNotFound(_))
    ));

    assert!(matches!(
        portal.public_article("initech", &article.id.to_string()),
        Err(PortalError::TenantNotFound(_))
    ));
}
