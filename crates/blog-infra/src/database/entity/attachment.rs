//! Attachment metadata entity for SeaORM.
//!
//! Payload bytes live in `attachment_chunks`; this table only records the
//! id, MIME type and total length.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub content_type: String,
    pub length: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attachment_chunk::Entity")]
    AttachmentChunk,
}

impl Related<super::attachment_chunk::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttachmentChunk.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Attachment.
impl From<Model> for blog_core::domain::Attachment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            content_type: model.content_type,
            length: model.length,
            created_at: model.created_at.into(),
        }
    }
}
