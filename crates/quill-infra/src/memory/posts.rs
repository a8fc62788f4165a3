use async_trait::async_trait;
use uuid::Uuid;

use quill_core::domain::Post;
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostQuery, PostRepository};

use super::Table;

/// In-memory post repository evaluating `PostQuery` directly.
pub struct InMemoryPostRepository {
    table: Table<Post>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.table.get(id).await)
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let slug = post.slug.clone();
        self.table
            .upsert(post.id, post, |other| other.slug == slug)
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.table.remove(id).await.map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let candidates = self.table.filter(|post| query.matches(post)).await;
        Ok(query.apply(candidates))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self.table.find(|post| post.slug == slug).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::NewPost;

    fn post(slug: &str) -> Post {
        Post::new(
            Uuid::new_v4(),
            NewPost {
                title: slug.to_string(),
                content: "content".to_string(),
                ..Default::default()
            },
            slug.to_string(),
        )
    }

    #[tokio::test]
    async fn test_save_rejects_duplicate_slug() {
        let repo = InMemoryPostRepository::new();
        repo.save(post("hello-world")).await.unwrap();

        let result = repo.save(post("hello-world")).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_resave_keeps_own_slug() {
        let repo = InMemoryPostRepository::new();
        let mut saved = repo.save(post("hello-world")).await.unwrap();
        saved.content = "edited".to_string();

        let resaved = repo.save(saved.clone()).await.unwrap();
        assert_eq!(resaved.content, "edited");
        assert_eq!(
            repo.find_by_slug("hello-world").await.unwrap().unwrap().id,
            saved.id
        );
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = InMemoryPostRepository::new();
        assert!(matches!(
            repo.delete(Uuid::new_v4()).await,
            Err(RepoError::NotFound)
        ));
    }
}
