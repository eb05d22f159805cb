use docshelf_core::db::open_db_in_memory;
use docshelf_core::{
    ArticleDraft, ArticleRepository, SqliteArticleRepository, SqliteTenantRepository,
    SqliteTopicRepository, TenantId, TopicDraft, TopicNode, TopicRepository, TopicTreeService,
    TreeServiceError, Visibility, VisibilityFilter,
};
use rusqlite::{params, Connection};
use uuid::Uuid;

fn tenant(conn: &Connection, slug: &str) -> TenantId {
    SqliteTenantRepository::try_new(conn)
        .unwrap()
        .create_tenant(slug, slug)
        .unwrap()
        .id
}

fn build(
    conn: &Connection,
    tenant_id: TenantId,
    requested: VisibilityFilter,
    is_authenticated: bool,
) -> Vec<TopicNode> {
    let service = TopicTreeService::new(SqliteTopicRepository::try_new(conn).unwrap());
    service
        .build_tree(&tenant_id.to_string(), requested, is_authenticated)
        .unwrap()
}

fn names(nodes: &[TopicNode]) -> Vec<&str> {
    nodes.iter().map(|node| node.name.as_str()).collect()
}

#[test]
fn roots_are_sorted_by_order_but_children_keep_fetch_order() {
    let conn = open_db_in_memory().unwrap();
    let tenant_id = tenant(&conn, "acme");
    let topics = SqliteTopicRepository::try_new(&conn).unwrap();

    let guides = topics
        .create_topic(tenant_id, &TopicDraft::new("Guides", Visibility::Public).with_order(2))
        .unwrap();
    topics
        .create_topic(tenant_id, &TopicDraft::new("Intro", Visibility::Public).with_order(1))
        .unwrap();
    topics
        .create_topic(
            tenant_id,
            &TopicDraft::new("Z", Visibility::Public)
                .with_parent(guides.id)
                .with_order(9),
        )
        .unwrap();
    topics
        .create_topic(
            tenant_id,
            &TopicDraft::new("A", Visibility::Public)
                .with_parent(guides.id)
                .with_order(0),
        )
        .unwrap();

    let tree = build(&conn, tenant_id, VisibilityFilter::All, false);

    assert_eq!(names(&tree), vec!["Intro", "Guides"]);
    assert_eq!(names(&tree[1].children), vec!["Z", "A"]);
}

#[test]
fn anonymous_caller_gets_public_topics_and_orphans_become_roots() {
    let conn = open_db_in_memory().unwrap();
    let tenant_id = tenant(&conn, "acme");
    let topics = SqliteTopicRepository::try_new(&conn).unwrap();

    let internal = topics
        .create_topic(tenant_id, &TopicDraft::new("Internal", Visibility::Private))
        .unwrap();
    topics
        .create_topic(
            tenant_id,
            &TopicDraft::new("Shared", Visibility::Public).with_parent(internal.id),
        )
        .unwrap();

    let anonymous = build(
        &conn,
        tenant_id,
        VisibilityFilter::Only(Visibility::Private),
        false,
    );
    assert_eq!(names(&anonymous), vec!["Shared"]);
    assert!(anonymous[0].children.is_empty());
    assert_eq!(anonymous[0].parent_id, Some(internal.id));

    let member = build(&conn, tenant_id, VisibilityFilter::All, true);
    assert_eq!(names(&member), vec!["Internal"]);
    assert_eq!(names(&member[0].children), vec!["Shared"]);

    let private_only = build(
        &conn,
        tenant_id,
        VisibilityFilter::Only(Visibility::Private),
        true,
    );
    assert_eq!(names(&private_only), vec!["Internal"]);
    assert!(private_only[0].children.is_empty());
}

#[test]
fn soft_deleted_topics_and_articles_are_left_out() {
    let conn = open_db_in_memory().unwrap();
    let tenant_id = tenant(&conn, "acme");
    let topics = SqliteTopicRepository::try_new(&conn).unwrap();
    let articles = SqliteArticleRepository::try_new(&conn).unwrap();

    let parent = topics
        .create_topic(tenant_id, &TopicDraft::new("Parent", Visibility::Public))
        .unwrap();
    let child = topics
        .create_topic(
            tenant_id,
            &TopicDraft::new("Child", Visibility::Public).with_parent(parent.id),
        )
        .unwrap();
    let kept = articles
        .create_article(tenant_id, &ArticleDraft::new(child.id, "Kept", "body"))
        .unwrap();
    let dropped = articles
        .create_article(tenant_id, &ArticleDraft::new(child.id, "Dropped", "body"))
        .unwrap();
    articles.soft_delete_article(tenant_id, dropped.id).unwrap();
    topics.soft_delete_topic(tenant_id, parent.id).unwrap();

    let tree = build(&conn, tenant_id, VisibilityFilter::All, true);

    assert_eq!(names(&tree), vec!["Child"]);
    let stubs: Vec<_> = tree[0].articles.iter().map(|stub| stub.id).collect();
    assert_eq!(stubs, vec![kept.id]);
    assert_eq!(tree[0].articles[0].title, "Kept");
}

#[test]
fn tree_is_scoped_to_one_tenant() {
    let conn = open_db_in_memory().unwrap();
    let acme = tenant(&conn, "acme");
    let globex = tenant(&conn, "globex");
    let topics = SqliteTopicRepository::try_new(&conn).unwrap();

    topics
        .create_topic(acme, &TopicDraft::new("Acme docs", Visibility::Public))
        .unwrap();
    topics
        .create_topic(globex, &TopicDraft::new("Globex docs", Visibility::Public))
        .unwrap();

    let tree = build(&conn, acme, VisibilityFilter::All, true);
    assert_eq!(names(&tree), vec!["Acme docs"]);
    assert!(tree.iter().all(|node| node.tenant_id == acme));
}

#[test]
fn foreign_tenant_parent_is_treated_as_root() {
    let conn = open_db_in_memory().unwrap();
    let acme = tenant(&conn, "acme");
    let globex = tenant(&conn, "globex");
    let topics = SqliteTopicRepository::try_new(&conn).unwrap();

    let foreign = topics
        .create_topic(globex, &TopicDraft::new("Foreign", Visibility::Public))
        .unwrap();
    let stray_id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO topics (id, tenant_id, name, visibility, parent_id)
         VALUES (?1, ?2, 'Stray', 'public', ?3);",
        params![stray_id.to_string(), acme.to_string(), foreign.id.to_string()],
    )
    .unwrap();

    let tree = build(&conn, acme, VisibilityFilter::All, true);

    assert_eq!(names(&tree), vec!["Stray"]);
    assert_eq!(tree[0].parent_id, Some(foreign.id));
}

#[test]
fn tenant_without_topics_yields_empty_forest() {
    let conn = open_db_in_memory().unwrap();
    let tenant_id = tenant(&conn, "empty");

    assert!(build(&conn, tenant_id, VisibilityFilter::All, true).is_empty());
}

#[test]
fn malformed_tenant_id_is_invalid_argument() {
    let conn = open_db_in_memory().unwrap();
    let service = TopicTreeService::new(SqliteTopicRepository::try_new(&conn).unwrap());

    let err = service
        .build_tree("not-a-uuid", VisibilityFilter::All, true)
        .unwrap_err();
    assert!(matches!(err, TreeServiceError::InvalidArgument(_)));
}
