use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attachment metadata - a binary object stored independently of the post
/// that references it. Deleting a post never deletes its attachment, so a
/// stored object may outlive every reference to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    /// MIME type recorded at upload time and replayed on download.
    pub content_type: String,
    pub length: i64,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    /// Download URL for this attachment, as embedded in `Post::image_url`.
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.id)
    }
}
