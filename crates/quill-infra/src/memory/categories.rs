use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use quill_core::domain::Category;
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, CategoryRepository};

use super::Table;

/// In-memory category repository. Slugs are unique.
pub struct InMemoryCategoryRepository {
    table: Table<Category>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }
}

impl Default for InMemoryCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.table.get(id).await)
    }

    async fn save(&self, category: Category) -> Result<Category, RepoError> {
        let slug = category.slug.clone();
        self.table
            .upsert(category.id, category, |other| other.slug == slug)
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.table.remove(id).await.map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_all(&self) -> Result<Vec<Category>, RepoError> {
        let mut all = self.table.all().await;
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        Ok(self.table.find(|c| c.slug == slug).await)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        Ok(self.table.filter(|c| ids.contains(&c.id)).await)
    }

    async fn rename(
        &self,
        id: Uuid,
        name: &str,
        slug: &str,
    ) -> Result<Option<Category>, RepoError> {
        self.table
            .update(
                id,
                |other| other.slug == slug,
                |c| {
                    c.name = name.to_string();
                    c.slug = slug.to_string();
                    c.updated_at = Utc::now();
                },
            )
            .await
    }

    async fn attach_post(&self, category_id: Uuid, post_id: Uuid) -> Result<(), RepoError> {
        self.table
            .modify(category_id, |c| {
                if !c.post_ids.contains(&post_id) {
                    c.post_ids.push(post_id);
                }
            })
            .await;
        Ok(())
    }

    async fn detach_post(&self, category_id: Uuid, post_id: Uuid) -> Result<(), RepoError> {
        self.table
            .modify(category_id, |c| c.post_ids.retain(|id| *id != post_id))
            .await;
        Ok(())
    }
}
