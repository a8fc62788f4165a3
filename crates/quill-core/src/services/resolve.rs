//! Reference resolution: author and category ids to display summaries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::bounded;
use crate::domain::{Post, PostDetail};
use crate::error::DomainError;
use crate::ports::{CategoryRepository, UserRepository};

/// Resolves the references of a batch of posts with one lookup per collection.
#[derive(Clone)]
pub struct Resolver {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    timeout: Duration,
}

impl Resolver {
    pub fn new(
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            users,
            categories,
            timeout,
        }
    }

    /// Dangling references resolve to `None` or are skipped.
    pub async fn details(&self, posts: Vec<Post>) -> Result<Vec<PostDetail>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids = unique(posts.iter().map(|p| p.author_id));
        let category_ids = unique(posts.iter().flat_map(|p| p.category_ids.iter().copied()));

        let (users, categories) = futures::try_join!(
            bounded(
                self.timeout,
                "resolve authors",
                self.users.find_by_ids(&author_ids)
            ),
            bounded(
                self.timeout,
                "resolve categories",
                self.categories.find_by_ids(&category_ids)
            ),
        )?;

        let authors: HashMap<Uuid, _> = users.iter().map(|u| (u.id, u.summary())).collect();
        let categories: HashMap<Uuid, _> =
            categories.iter().map(|c| (c.id, c.summary())).collect();

        Ok(posts
            .into_iter()
            .map(|post| PostDetail {
                author: authors.get(&post.author_id).cloned(),
                categories: post
                    .category_ids
                    .iter()
                    .filter_map(|id| categories.get(id).cloned())
                    .collect(),
                post,
            })
            .collect())
    }

    pub async fn detail(&self, post: Post) -> Result<PostDetail, DomainError> {
        let mut details = self.details(vec![post]).await?;
        details
            .pop()
            .ok_or_else(|| DomainError::Internal("Resolution dropped a post".to_string()))
    }
}

fn unique(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
