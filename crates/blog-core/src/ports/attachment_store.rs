//! Attachment store port - chunked binary object storage.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use uuid::Uuid;

use crate::domain::Attachment;

/// Lazy byte stream produced by [`AttachmentStore::get`]. Chunks arrive in
/// storage order, so concatenating them reproduces the original payload.
pub type AttachmentBytes = Pin<Box<dyn Stream<Item = Result<Bytes, StoreError>> + Send>>;

/// Chunked binary object store keyed by generated ids.
///
/// There is no update-in-place: replacing an attachment always stores a new
/// object and leaves the previous one behind.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store a payload and its MIME type, returning the attachment metadata.
    async fn put(&self, data: Vec<u8>, content_type: &str) -> Result<Attachment, StoreError>;

    /// Open a download stream for a stored object.
    async fn get(&self, id: Uuid) -> Result<(Attachment, AttachmentBytes), StoreError>;
}

/// Attachment store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Attachment not found: {0}")]
    NotFound(Uuid),

    #[error("Storage backend error: {0}")]
    Backend(String),
}
