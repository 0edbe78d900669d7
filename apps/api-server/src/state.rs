//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{AttachmentStore, PostRepository, UserRepository};
use blog_infra::database::{
    PostgresAttachmentStore, PostgresPostRepository, PostgresUserRepository, connect,
};
use blog_infra::memory::{
    InMemoryAttachmentStore, InMemoryPostRepository, InMemoryUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        if let Some(db_config) = &config.database {
            match connect(db_config).await {
                Ok(db) => {
                    tracing::info!("Application state initialized (postgres)");
                    let db = Arc::new(db);
                    return Self {
                        users: Arc::new(PostgresUserRepository::new(db.clone())),
                        posts: Arc::new(PostgresPostRepository::new(db.clone())),
                        attachments: Arc::new(PostgresAttachmentStore::new(db)),
                        max_upload_bytes: config.max_upload_bytes,
                    };
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        Self::in_memory(config.max_upload_bytes)
    }

    /// State backed entirely by in-memory adapters. Also used by handler
    /// tests.
    pub fn in_memory(max_upload_bytes: usize) -> Self {
        let users = InMemoryUserRepository::new();
        let posts = InMemoryPostRepository::sharing(&users);

        Self {
            users: Arc::new(users),
            posts: Arc::new(posts),
            attachments: Arc::new(InMemoryAttachmentStore::new()),
            max_upload_bytes,
        }
    }
}
