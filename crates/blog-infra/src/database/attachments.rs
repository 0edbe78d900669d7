//! Chunked attachment store over PostgreSQL.
//!
//! Payloads are split into fixed-size chunks at store time and read back
//! one chunk per query, so downloads never need the whole object in memory.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DbConn, EntityTrait, Set};
use uuid::Uuid;

use blog_core::domain::Attachment;
use blog_core::ports::{AttachmentBytes, AttachmentStore, StoreError};

use super::entity::attachment::{self, Entity as AttachmentEntity};
use super::entity::attachment_chunk::{self, Entity as ChunkEntity};

/// Chunk size in bytes (255 KiB).
pub const CHUNK_SIZE: usize = 255 * 1024;

/// PostgreSQL-backed attachment store.
#[derive(Clone)]
pub struct PostgresAttachmentStore {
    db: Arc<DbConn>,
}

impl PostgresAttachmentStore {
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self { db: db.into() }
    }
}

#[async_trait]
impl AttachmentStore for PostgresAttachmentStore {
    async fn put(&self, data: Vec<u8>, content_type: &str) -> Result<Attachment, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let meta = attachment::ActiveModel {
            id: Set(id),
            content_type: Set(content_type.to_string()),
            length: Set(data.len() as i64),
            created_at: Set(now.into()),
        };
        let meta = meta
            .insert(&*self.db)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let chunks: Vec<attachment_chunk::ActiveModel> = data
            .chunks(CHUNK_SIZE)
            .enumerate()
            .map(|(seq, chunk)| attachment_chunk::ActiveModel {
                attachment_id: Set(id),
                seq: Set(seq as i32),
                data: Set(chunk.to_vec()),
            })
            .collect();

        if !chunks.is_empty() {
            ChunkEntity::insert_many(chunks)
                .exec(&*self.db)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }

        tracing::debug!(id = %id, size = meta.length, "Stored attachment");
        Ok(meta.into())
    }

    async fn get(&self, id: Uuid) -> Result<(Attachment, AttachmentBytes), StoreError> {
        let meta = AttachmentEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .ok_or(StoreError::NotFound(id))?;

        // One chunk per query, in seq order, fetched only as the consumer
        // polls the stream.
        let stream = futures::stream::try_unfold(
            (self.db.clone(), 0i32),
            move |(db, seq)| async move {
                let chunk = ChunkEntity::find_by_id((id, seq))
                    .one(&*db)
                    .await
                    .map_err(|e| StoreError::Backend(e.to_string()))?;

                Ok(chunk.map(|c| (Bytes::from(c.data), (db, seq + 1))))
            },
        );

        Ok((meta.into(), Box::pin(stream)))
    }
}
