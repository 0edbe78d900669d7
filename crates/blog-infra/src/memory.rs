//! In-memory adapter implementations - used as fallback when the database
//! is not configured, and by handler tests.
//!
//! Note: data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{Attachment, AuthorRef, Post, PostWithAuthor, User};
use blog_core::error::RepoError;
use blog_core::ports::{
    AttachmentBytes, AttachmentStore, BaseRepository, PostRepository, StoreError, UserRepository,
};

use crate::database::CHUNK_SIZE;

type UserMap = Arc<RwLock<HashMap<Uuid, User>>>;

/// In-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: UserMap,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        let taken = users
            .values()
            .any(|u| u.username == user.username && u.id != user.id);
        if taken {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.users.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

/// In-memory post repository. Shares the user map with the repository it
/// was built from so author projections resolve.
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
    users: UserMap,
}

impl InMemoryPostRepository {
    pub fn sharing(users: &InMemoryUserRepository) -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
            users: users.users.clone(),
        }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.posts.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_all_with_authors(&self) -> Result<Vec<PostWithAuthor>, RepoError> {
        let users = self.users.read().await;
        let mut joined: Vec<PostWithAuthor> = self
            .posts
            .read()
            .await
            .values()
            .filter_map(|post| {
                users.get(&post.author_id).map(|author| PostWithAuthor {
                    post: post.clone(),
                    author: AuthorRef {
                        id: author.id,
                        username: author.username.clone(),
                    },
                })
            })
            .collect();

        joined.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
        Ok(joined)
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        // Lock order must match find_all_with_authors: users before posts.
        // Tokio's RwLock is fair, so mixed orders can deadlock under
        // queued writers.
        let users = self.users.read().await;
        let posts = self.posts.read().await;
        let Some(post) = posts.get(&id) else {
            return Ok(None);
        };

        Ok(users.get(&post.author_id).map(|author| PostWithAuthor {
            post: post.clone(),
            author: AuthorRef {
                id: author.id,
                username: author.username.clone(),
            },
        }))
    }
}

/// In-memory attachment store. Payloads are kept whole but streamed back
/// chunked, matching the database-backed store.
#[derive(Default)]
pub struct InMemoryAttachmentStore {
    objects: RwLock<HashMap<Uuid, (Attachment, Vec<u8>)>>,
}

impl InMemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
    async fn put(&self, data: Vec<u8>, content_type: &str) -> Result<Attachment, StoreError> {
        let attachment = Attachment {
            id: Uuid::new_v4(),
            content_type: content_type.to_string(),
            length: data.len() as i64,
            created_at: chrono::Utc::now(),
        };

        self.objects
            .write()
            .await
            .insert(attachment.id, (attachment.clone(), data));
        Ok(attachment)
    }

    async fn get(&self, id: Uuid) -> Result<(Attachment, AttachmentBytes), StoreError> {
        let objects = self.objects.read().await;
        let (attachment, data) = objects.get(&id).ok_or(StoreError::NotFound(id))?;

        let chunks: Vec<Result<Bytes, StoreError>> = data
            .chunks(CHUNK_SIZE)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        let stream: AttachmentBytes = Box::pin(futures::stream::iter(chunks));
        Ok((attachment.clone(), stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_attachment_round_trip() {
        let store = InMemoryAttachmentStore::new();
        let payload = vec![7u8; CHUNK_SIZE + 100]; // spans two chunks

        let stored = store.put(payload.clone(), "image/png").await.unwrap();
        assert_eq!(stored.length, payload.len() as i64);

        let (meta, stream) = store.get(stored.id).await.unwrap();
        assert_eq!(meta.content_type, "image/png");

        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        assert_eq!(chunks.len(), 2);
        let bytes: Vec<u8> = chunks.concat();
        assert_eq!(bytes, payload);
    }

    #[tokio::test]
    async fn test_get_missing_attachment() {
        let store = InMemoryAttachmentStore::new();
        let id = Uuid::new_v4();

        let result = store.get(id).await;
        assert!(matches!(result, Err(StoreError::NotFound(found)) if found == id));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let users = InMemoryUserRepository::new();
        users
            .save(User::new("alice".into(), "hash1".into()))
            .await
            .unwrap();

        let result = users.save(User::new("alice".into(), "hash2".into())).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let users = InMemoryUserRepository::new();
        let author = users
            .save(User::new("alice".into(), "hash".into()))
            .await
            .unwrap();

        let posts = InMemoryPostRepository::sharing(&users);
        for i in 0..3i64 {
            let mut post = Post::new(
                author.id,
                format!("Post {i}"),
                None,
                "Content".into(),
                None,
            );
            post.created_at += TimeDelta::seconds(i);
            posts.save(post).await.unwrap();
        }

        let listed = posts.find_all_with_authors().await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|p| p.post.title.as_str()).collect();
        assert_eq!(titles, vec!["Post 2", "Post 1", "Post 0"]);
        assert!(listed.iter().all(|p| p.author.username == "alice"));
    }

    // Hammers both join reads against writes on both maps. Hangs if the
    // two readers ever take the user and post locks in different orders.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_and_writes_complete() {
        let users = Arc::new(InMemoryUserRepository::new());
        let posts = Arc::new(InMemoryPostRepository::sharing(&users));

        let author = users
            .save(User::new("alice".into(), "hash".into()))
            .await
            .unwrap();
        let seed = posts
            .save(Post::new(author.id, "Seed".into(), None, "Content".into(), None))
            .await
            .unwrap();

        for i in 0..100u32 {
            let list = {
                let posts = posts.clone();
                tokio::spawn(async move { posts.find_all_with_authors().await })
            };
            let get = {
                let posts = posts.clone();
                let id = seed.id;
                tokio::spawn(async move { posts.find_with_author(id).await })
            };
            let user_write = {
                let users = users.clone();
                tokio::spawn(async move {
                    users.save(User::new(format!("user-{i}"), "hash".into())).await
                })
            };
            let post_write = {
                let posts = posts.clone();
                let author_id = author.id;
                tokio::spawn(async move {
                    posts
                        .save(Post::new(
                            author_id,
                            format!("Post {i}"),
                            None,
                            "Content".into(),
                            None,
                        ))
                        .await
                })
            };

            list.await.unwrap().unwrap();
            assert!(get.await.unwrap().unwrap().is_some());
            user_write.await.unwrap().unwrap();
            post_write.await.unwrap().unwrap();
        }
    }
}
