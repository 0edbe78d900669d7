//! Domain entities - the core business objects.

mod attachment;

mod post;

mod user;

pub use attachment::Attachment;
pub use post::{AuthorRef, Post, PostWithAuthor};
pub use user::User;
