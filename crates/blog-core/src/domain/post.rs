use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Post entity - a single blog post.
///
/// `author_id` is set exactly once at creation, from the authenticated
/// principal, and is never reassigned afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    /// `/uploads/<attachment id>` when an image is attached, `None` otherwise.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `author_id`.
    pub fn new(
        author_id: Uuid,
        title: String,
        subtitle: Option<String>,
        content: String,
        image_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            subtitle,
            content,
            image_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate user-supplied post fields. Title and content must be
    /// non-empty after trimming.
    pub fn validate_fields(title: &str, content: &str) -> Result<(), DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::Validation("Title is required".to_string()));
        }
        if content.trim().is_empty() {
            return Err(DomainError::Validation("Content is required".to_string()));
        }
        Ok(())
    }

    /// Check whether `principal_id` owns this post.
    pub fn is_owned_by(&self, principal_id: Uuid) -> bool {
        self.author_id == principal_id
    }
}

/// Read projection of a post's author: the only user fields exposed on
/// post reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub username: String,
}

/// A post joined with its author projection, as returned by list/get.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: AuthorRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_sets_author() {
        let author = Uuid::new_v4();
        let post = Post::new(author, "Title".into(), None, "Body".into(), None);

        assert_eq!(post.author_id, author);
        assert!(post.is_owned_by(author));
        assert!(!post.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let result = Post::validate_fields("   ", "content");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_blank_content() {
        let result = Post::validate_fields("title", "");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_accepts_filled_fields() {
        assert!(Post::validate_fields("title", "content").is_ok());
    }
}
