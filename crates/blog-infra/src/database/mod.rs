//! Database adapters: connection setup, SeaORM entities and repositories,
//! and the chunked attachment store.

mod attachments;
mod connections;
pub mod entity;
mod postgres_base;
mod postgres_repo;

#[cfg(test)]
mod tests;

pub use attachments::{CHUNK_SIZE, PostgresAttachmentStore};
pub use connections::{DatabaseConfig, connect};
pub use postgres_base::PostgresBaseRepository;
pub use postgres_repo::{PostgresPostRepository, PostgresUserRepository};
