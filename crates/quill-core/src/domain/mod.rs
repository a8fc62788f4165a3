//! Domain entities - the core business objects.

mod category;
mod post;
pub mod slug;
mod user;

pub use category::{Category, CategorySummary};
pub use post::{
    Comment, NewPost, Post, PostChanges, PostDetail, PostStatus, PostSummary, EXCERPT_CHARS,
};
pub use user::{AuthorSummary, User};
