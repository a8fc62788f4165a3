//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod query;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use query::{PostOrder, PostQuery, TextMatch, Topics};
pub use repository::{BaseRepository, CategoryRepository, PostRepository, UserRepository};
