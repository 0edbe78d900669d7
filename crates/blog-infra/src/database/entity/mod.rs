//! SeaORM entities.

pub mod attachment;
pub mod attachment_chunk;
pub mod post;
pub mod user;
