use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};
use uuid::Uuid;

use quill_core::domain::{Comment, Post, PostStatus, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, PostOrder, PostQuery, PostRepository, TextMatch, Topics, UserRepository,
};

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{
    PostgresPostRepository, PostgresUserRepository, select_posts,
};

fn post_model(id: Uuid, comments: serde_json::Value) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id: Uuid::new_v4(),
        title: "Test Post".to_owned(),
        slug: "test-post".to_owned(),
        content: "Content".to_owned(),
        image_url: String::new(),
        is_featured: false,
        status: post::Status::Published,
        tags: vec!["rust".to_owned()],
        category_ids: vec![],
        likes: vec![Uuid::new_v4()],
        views: 42,
        comments,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn sql(query: &PostQuery) -> String {
    select_posts(query).build(DatabaseBackend::Postgres).to_string()
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let comment = Comment::new(Uuid::new_v4(), "Nice".to_owned());
    let comments = serde_json::to_value(vec![comment.clone()]).unwrap();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, comments)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.views, 42);
    assert_eq!(post.like_count(), 1);
    assert_eq!(post.comments, vec![comment]);
}

#[tokio::test]
async fn test_malformed_comments_surface_as_query_error() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(
            post_id,
            serde_json::json!({"not": "a list"}),
        )]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(matches!(
        repo.find_by_id(post_id).await,
        Err(RepoError::Query(_))
    ));
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(matches!(
        repo.delete(Uuid::new_v4()).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_find_user_by_login() {
    let now = Utc::now();
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: user_id,
            name: "Ada".to_owned(),
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            avatar: String::new(),
            bio: String::new(),
            role: 0,
            post_ids: vec![],
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user: User = repo.find_by_login("ada").await.unwrap().unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.username, "ada");
}

#[tokio::test]
async fn test_find_by_ids_skips_query_for_empty_input() {
    // No query results appended: any query would fail.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresUserRepository::new(db);

    assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_runs_translated_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(
            Uuid::new_v4(),
            serde_json::json!([]),
        )]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let posts = repo
        .find(&PostQuery::new().tagged("rust").with_status(PostStatus::Published))
        .await
        .unwrap();

    assert_eq!(posts.len(), 1);
}

#[test]
fn test_related_query_uses_array_overlap_and_exclusion() {
    let source = Uuid::new_v4();
    let query = PostQuery::new()
        .related_to(Topics {
            category_ids: vec![Uuid::new_v4()],
            tags: vec!["rust".to_owned()],
        })
        .excluding(source)
        .limit(5);

    let sql = sql(&query);
    assert!(sql.contains("category_ids &&"));
    assert!(sql.contains("tags &&"));
    assert!(sql.contains(" OR "));
    assert!(sql.contains(&source.to_string()));
    assert!(sql.contains("LIMIT 5"));
    assert!(sql.contains(r#"ORDER BY "posts"."created_at" ASC, "posts"."id" ASC"#));
}

#[test]
fn test_popularity_order_ranks_likes_then_views_then_recency() {
    let query = PostQuery::new()
        .with_status(PostStatus::Published)
        .ordered_by(PostOrder::Popularity)
        .limit(6);

    let sql = sql(&query);
    assert!(sql.contains("'published'"));
    assert!(sql.contains(
        r#"ORDER BY cardinality(likes) DESC, "posts"."views" DESC, "posts"."created_at" DESC, "posts"."id" DESC"#
    ));
}

#[test]
fn test_substring_and_full_text_translate_differently() {
    let substring = sql(&PostQuery::new().matching(TextMatch::Substring("50%".to_owned())));
    assert!(substring.contains("ILIKE"));
    assert!(substring.contains(r"'%50\%%'") || substring.contains(r"E'%50\\%%'"));

    let full_text = sql(&PostQuery::new().matching(TextMatch::FullText("rust async".to_owned())));
    assert!(full_text.contains("plainto_tsquery('english'"));
    assert!(!full_text.contains("ILIKE"));
}

#[test]
fn test_custom_filters_bind_their_values() {
    let category_id = Uuid::new_v4();
    let query = PostQuery::new()
        .in_category(category_id)
        .tagged("rust")
        .matching(TextMatch::Substring("50%".to_owned()));

    let statement = select_posts(&query).build(DatabaseBackend::Postgres);

    assert!(statement.sql.contains("$1 = ANY(category_ids)"));
    assert!(statement.sql.contains("$2 = ANY(tags)"));
    assert!(statement.sql.contains("(title ILIKE $3 OR content ILIKE $4)"));
    assert!(!statement.sql.contains('?'));

    let values = statement.values.unwrap().0;
    assert_eq!(values.len(), 4);
    assert_eq!(values[0], sea_orm::Value::from(category_id));
    assert_eq!(values[1], sea_orm::Value::from("rust".to_owned()));
    assert_eq!(values[2], sea_orm::Value::from(r"%50\%%".to_owned()));
    assert_eq!(values[2], values[3]);
}

#[tokio::test]
async fn test_save_upserts_through_the_generic_repository() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let repo = PostgresUserRepository::new(db);
    let user = User::new(
        "Ada".to_owned(),
        "ada".to_owned(),
        "ada@example.com".to_owned(),
        "hash".to_owned(),
    );

    let saved = repo.save(user.clone()).await.unwrap();
    assert_eq!(saved.id, user.id);
}
