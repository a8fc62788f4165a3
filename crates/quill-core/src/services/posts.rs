//! Post lifecycle: create, update, delete and comments.
//!
//! Every mutation is a read-modify-write: load a snapshot, derive the next
//! version with a pure function on `Post`, then persist it.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::{Resolver, bounded};
use crate::domain::slug::{self, MAX_SUFFIX};
use crate::domain::{Comment, NewPost, Post, PostChanges, PostDetail};
use crate::error::{DomainError, RepoError};
use crate::ports::{CategoryRepository, PostQuery, PostRepository, UserRepository};

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    resolver: Resolver,
    timeout: Duration,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        timeout: Duration,
    ) -> Self {
        let resolver = Resolver::new(users.clone(), categories.clone(), timeout);
        Self {
            posts,
            users,
            categories,
            resolver,
            timeout,
        }
    }

    pub async fn create(&self, author_id: Uuid, new: NewPost) -> Result<Post, DomainError> {
        require_text("title", &new.title)?;
        require_text("content", &new.content)?;

        let slug = self.unique_slug(&new.title, None).await?;
        let post = Post::new(author_id, new, slug);
        let saved = bounded(self.timeout, "save post", self.posts.save(post)).await?;

        self.link_author(saved.author_id, saved.id).await;
        for category_id in &saved.category_ids {
            self.link_category(*category_id, saved.id).await;
        }

        tracing::info!(post_id = %saved.id, slug = %saved.slug, "Post created");
        Ok(saved)
    }

    pub async fn list(&self) -> Result<Vec<PostDetail>, DomainError> {
        let posts = bounded(self.timeout, "find posts", self.posts.find(&PostQuery::new())).await?;
        self.resolver.details(posts).await
    }

    pub async fn get(&self, id: Uuid) -> Result<PostDetail, DomainError> {
        let post = self.load(id).await?;
        self.resolver.detail(post).await
    }

    /// Apply a partial update. The slug follows the title.
    pub async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, DomainError> {
        if let Some(title) = &changes.title {
            require_text("title", title)?;
        }
        if let Some(content) = &changes.content {
            require_text("content", content)?;
        }

        let current = self.load(id).await?;
        let mut next = current.with_changes(changes);
        if next.title != current.title {
            let slug = self.unique_slug(&next.title, Some(id)).await?;
            next = next.with_slug(slug);
        }

        let saved = bounded(self.timeout, "save post", self.posts.save(next)).await?;

        for removed in current
            .category_ids
            .iter()
            .filter(|c| !saved.category_ids.contains(c))
        {
            self.unlink_category(*removed, id).await;
        }
        for added in saved
            .category_ids
            .iter()
            .filter(|c| !current.category_ids.contains(c))
        {
            self.link_category(*added, id).await;
        }

        tracing::info!(post_id = %id, slug = %saved.slug, "Post updated");
        Ok(saved)
    }

    /// Delete a post and return the removed document.
    pub async fn delete(&self, id: Uuid) -> Result<Post, DomainError> {
        let post = self.load(id).await?;
        let removed = bounded(self.timeout, "delete post", async {
            match self.posts.delete(id).await {
                Err(RepoError::NotFound) => Ok(false),
                other => other.map(|_| true),
            }
        })
        .await?;
        if !removed {
            return Err(DomainError::not_found("Post", id));
        }

        if let Err(e) = bounded(
            self.timeout,
            "unlink author",
            self.users.detach_post(post.author_id, id),
        )
        .await
        {
            tracing::warn!(post_id = %id, error = %e, "Failed to unlink post from author");
        }
        for category_id in &post.category_ids {
            self.unlink_category(*category_id, id).await;
        }

        tracing::info!(post_id = %id, "Post deleted");
        Ok(post)
    }

    /// Prepend a comment to a post.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        text: String,
    ) -> Result<Comment, DomainError> {
        require_text("text", &text)?;

        let snapshot = self.load(post_id).await?;
        let comment = Comment::new(author_id, text);
        let next = snapshot.with_comment(comment.clone());
        bounded(self.timeout, "save post", self.posts.save(next)).await?;

        tracing::debug!(%post_id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    async fn load(&self, id: Uuid) -> Result<Post, DomainError> {
        bounded(self.timeout, "load post", self.posts.find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    /// First free slug candidate for `title`, treating slugs held by `owner`
    /// as free.
    async fn unique_slug(&self, title: &str, owner: Option<Uuid>) -> Result<String, DomainError> {
        let base = slug::slugify(title)?;
        for attempt in 0..=MAX_SUFFIX {
            let candidate = slug::candidate(&base, attempt);
            let holder =
                bounded(self.timeout, "find post by slug", self.posts.find_by_slug(&candidate))
                    .await?;
            match holder {
                None => return Ok(candidate),
                Some(existing) if Some(existing.id) == owner => return Ok(candidate),
                Some(_) => continue,
            }
        }
        Err(DomainError::Conflict(format!(
            "no free slug left for '{base}'"
        )))
    }

    // Back-references are informational; failures are logged, not returned.

    async fn link_author(&self, user_id: Uuid, post_id: Uuid) {
        if let Err(e) = bounded(
            self.timeout,
            "link author",
            self.users.attach_post(user_id, post_id),
        )
        .await
        {
            tracing::warn!(%post_id, %user_id, error = %e, "Failed to link post to author");
        }
    }

    async fn link_category(&self, category_id: Uuid, post_id: Uuid) {
        if let Err(e) = bounded(
            self.timeout,
            "link category",
            self.categories.attach_post(category_id, post_id),
        )
        .await
        {
            tracing::warn!(%post_id, %category_id, error = %e, "Failed to link post to category");
        }
    }

    async fn unlink_category(&self, category_id: Uuid, post_id: Uuid) {
        if let Err(e) = bounded(
            self.timeout,
            "unlink category",
            self.categories.detach_post(category_id, post_id),
        )
        .await
        {
            tracing::warn!(%post_id, %category_id, error = %e, "Failed to unlink post from category");
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid(format!("{field} must not be empty")));
    }
    Ok(())
}
