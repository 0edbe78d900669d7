//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod attachment_store;
mod auth;
mod repository;

pub use attachment_store::{AttachmentBytes, AttachmentStore, StoreError};
pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use repository::{BaseRepository, PostRepository, UserRepository};
