use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::bounded;
use crate::domain::Category;
use crate::domain::slug;
use crate::error::{DomainError, RepoError};
use crate::ports::CategoryRepository;

/// Category CRUD. Slugs follow the name; a slug held by another category is a
/// conflict.
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    timeout: Duration,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, timeout: Duration) -> Self {
        Self {
            categories,
            timeout,
        }
    }

    pub async fn create(&self, name: &str) -> Result<Category, DomainError> {
        let name = require_name(name)?;
        let slug = self.free_slug(&name, None).await?;
        let category = bounded(
            self.timeout,
            "save category",
            self.categories.save(Category::new(name, slug)),
        )
        .await?;

        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        bounded(self.timeout, "list categories", self.categories.find_all()).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Category, DomainError> {
        bounded(self.timeout, "load category", self.categories.find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    pub async fn update(&self, id: Uuid, name: &str) -> Result<Category, DomainError> {
        let name = require_name(name)?;
        self.get(id).await?;
        let slug = self.free_slug(&name, Some(id)).await?;

        bounded(
            self.timeout,
            "rename category",
            self.categories.rename(id, &name, &slug),
        )
        .await?
        .ok_or_else(|| DomainError::not_found("Category", id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<Category, DomainError> {
        let category = self.get(id).await?;
        let removed = bounded(self.timeout, "delete category", async {
            match self.categories.delete(id).await {
                Err(RepoError::NotFound) => Ok(false),
                other => other.map(|_| true),
            }
        })
        .await?;
        if !removed {
            return Err(DomainError::not_found("Category", id));
        }

        tracing::info!(category_id = %id, "Category deleted");
        Ok(category)
    }

    async fn free_slug(&self, name: &str, owner: Option<Uuid>) -> Result<String, DomainError> {
        let slug = slug::slugify(name)?;
        let holder = bounded(
            self.timeout,
            "find category by slug",
            self.categories.find_by_slug(&slug),
        )
        .await?;
        match holder {
            Some(existing) if Some(existing.id) != owner => Err(DomainError::Conflict(format!(
                "category slug '{slug}' is already taken"
            ))),
            _ => Ok(slug),
        }
    }
}

fn require_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::invalid("name must not be empty"));
    }
    Ok(name.to_string())
}
