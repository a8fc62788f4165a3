use async_trait::async_trait;
use uuid::Uuid;

use super::PostQuery;
use crate::domain::{Category, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Find a user whose email or username equals `login`.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepoError>;

    /// Batch lookup used for reference resolution. Missing ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    async fn attach_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), RepoError>;

    async fn detach_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Predicate-based find with sort and limit.
    async fn find(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_all(&self) -> Result<Vec<Category>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Batch lookup used for reference resolution. Missing ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError>;

    /// Change name and slug only, leaving the back-reference list untouched.
    /// Returns `None` when the category is absent.
    async fn rename(
        &self,
        id: Uuid,
        name: &str,
        slug: &str,
    ) -> Result<Option<Category>, RepoError>;

    /// Add `post_id` to the back-reference list. Unknown categories are ignored.
    async fn attach_post(&self, category_id: Uuid, post_id: Uuid) -> Result<(), RepoError>;

    async fn detach_post(&self, category_id: Uuid, post_id: Uuid) -> Result<(), RepoError>;
}
