//! Initial database migration.
//!
//! Creates the users, posts, attachments and attachment_chunks tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const USERS_SQL: &str = r#"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
"#;

const POSTS_SQL: &str = r#"
CREATE TABLE posts (
    id UUID PRIMARY KEY,
    author_id UUID NOT NULL REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE,
    title TEXT NOT NULL,
    subtitle TEXT,
    content TEXT NOT NULL,
    image_url TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX posts_created_at_idx ON posts (created_at DESC);
"#;

const ATTACHMENTS_SQL: &str = r#"
CREATE TABLE attachments (
    id UUID PRIMARY KEY,
    content_type TEXT NOT NULL,
    length BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE attachment_chunks (
    attachment_id UUID NOT NULL REFERENCES attachments(id) ON UPDATE CASCADE ON DELETE CASCADE,
    seq INTEGER NOT NULL,
    data BYTEA NOT NULL,
    PRIMARY KEY (attachment_id, seq)
);
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(POSTS_SQL).await?;
        db.execute_unprepared(ATTACHMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP TABLE IF EXISTS attachment_chunks;")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS attachments;")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS posts;").await?;
        db.execute_unprepared("DROP TABLE IF EXISTS users;").await?;

        Ok(())
    }
}
