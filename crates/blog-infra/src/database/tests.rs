use blog_core::domain::{Post, User};
use blog_core::ports::{AttachmentStore, BaseRepository, StoreError, UserRepository};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use crate::database::entity::{attachment, post, user};
use crate::database::{PostgresAttachmentStore, PostgresPostRepository, PostgresUserRepository};

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = uuid::Uuid::new_v4();
    let author_id = uuid::Uuid::new_v4();
    let now = chrono::Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post::Model {
            id: post_id,
            author_id,
            title: "Test Post".to_owned(),
            subtitle: Some("Subtitle".to_owned()),
            content: "Content".to_owned(),
            image_url: None,
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    assert!(result.is_some());
    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
}

#[tokio::test]
async fn test_find_user_by_username() {
    let user_id = uuid::Uuid::new_v4();
    let now = chrono::Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: user_id,
            username: "alice".to_owned(),
            password_hash: "$argon2$...".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let result: Option<User> = repo.find_by_username("alice").await.unwrap();

    assert!(result.is_some());
    assert_eq!(result.unwrap().id, user_id);
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

    let result: Result<(), _> = BaseRepository::<Post, _>::delete(&repo, uuid::Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(blog_core::error::RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_get_missing_attachment_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<attachment::Model>::new()])
        .into_connection();

    let store = PostgresAttachmentStore::new(db);
    let id = uuid::Uuid::new_v4();

    let result = store.get(id).await;
    assert!(matches!(result, Err(StoreError::NotFound(found)) if found == id));
}
