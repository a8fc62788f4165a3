//! Read-only retrieval and ranking over the post collection.
//!
//! Visibility differs per operation and is kept that way on purpose:
//! `by_tag` and `popular` only see published posts, while `related_to`,
//! `by_category`, `search` and `filter` see every status.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::{Resolver, bounded};
use crate::domain::{PostDetail, PostStatus, PostSummary};
use crate::error::DomainError;
use crate::ports::{PostOrder, PostQuery, PostRepository, TextMatch, Topics};

/// Number of posts returned by the related-posts endpoint.
pub const RELATED_LIMIT: u64 = 5;

/// Page size of `popular` when none is given.
pub const DEFAULT_POPULAR_SIZE: u64 = 6;

/// Parse a raw page-size parameter. Absent means the default; anything that is
/// not a positive integer is rejected.
pub fn parse_page_size(raw: Option<&str>) -> Result<Option<i64>, DomainError> {
    match raw.map(str::trim) {
        None => Ok(None),
        Some(text) => text
            .parse::<i64>()
            .map(Some)
            .map_err(|_| DomainError::invalid(format!("size must be a positive integer, got '{text}'"))),
    }
}

/// Query and ranking service. Never mutates a document.
pub struct PostQueryService {
    posts: Arc<dyn PostRepository>,
    resolver: Resolver,
    timeout: Duration,
}

impl PostQueryService {
    pub fn new(posts: Arc<dyn PostRepository>, resolver: Resolver, timeout: Duration) -> Self {
        Self {
            posts,
            resolver,
            timeout,
        }
    }

    /// Up to `limit` posts sharing a category or a tag with the given post,
    /// oldest first. Fails with `NotFound` when the source post is missing.
    pub async fn related_to(
        &self,
        post_id: Uuid,
        limit: u64,
    ) -> Result<Vec<PostDetail>, DomainError> {
        let source = bounded(self.timeout, "load post", self.posts.find_by_id(post_id))
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        let topics = Topics::of(&source);
        if topics.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let query = PostQuery::new()
            .related_to(topics)
            .excluding(source.id)
            .ordered_by(PostOrder::Oldest)
            .limit(limit);

        tracing::debug!(%post_id, limit, "Finding related posts");
        self.run(query).await
    }

    /// Every post referencing the category, drafts included.
    pub async fn by_category(&self, category_id: Uuid) -> Result<Vec<PostDetail>, DomainError> {
        let query = PostQuery::new()
            .in_category(category_id)
            .ordered_by(PostOrder::Oldest);
        self.run(query).await
    }

    /// Published posts carrying `tag`, newest first.
    pub async fn by_tag(&self, tag: &str) -> Result<Vec<PostDetail>, DomainError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(DomainError::invalid("tag must not be empty"));
        }

        let query = PostQuery::new()
            .tagged(tag)
            .with_status(PostStatus::Published)
            .ordered_by(PostOrder::Newest);
        self.run(query).await
    }

    /// Published posts ranked by likes, then views, then recency.
    pub async fn popular(&self, size: Option<i64>) -> Result<Vec<PostSummary>, DomainError> {
        let size = match size {
            None => DEFAULT_POPULAR_SIZE,
            Some(n) if n > 0 => n as u64,
            Some(n) => {
                return Err(DomainError::invalid(format!(
                    "size must be a positive integer, got {n}"
                )));
            }
        };

        let query = PostQuery::new()
            .with_status(PostStatus::Published)
            .ordered_by(PostOrder::Popularity)
            .limit(size);

        let posts = bounded(self.timeout, "find posts", self.posts.find(&query)).await?;
        Ok(posts.iter().map(|p| p.summary()).collect())
    }

    /// Case-insensitive substring search over title and content, optionally
    /// restricted to one tag. Drafts are searchable.
    pub async fn search(
        &self,
        text: &str,
        tag: Option<&str>,
    ) -> Result<Vec<PostDetail>, DomainError> {
        let mut query = PostQuery::new()
            .matching(TextMatch::Substring(text.trim().to_string()))
            .ordered_by(PostOrder::Oldest);
        if let Some(tag) = non_blank(tag) {
            query = query.tagged(tag);
        }
        self.run(query).await
    }

    /// Category filter, or indexed full-text search when `search_text` is
    /// given. The text search takes precedence and ignores the category.
    pub async fn filter(
        &self,
        category_id: Option<Uuid>,
        search_text: Option<&str>,
    ) -> Result<Vec<PostDetail>, DomainError> {
        let query = match (non_blank(search_text), category_id) {
            (Some(text), _) => {
                PostQuery::new().matching(TextMatch::FullText(text.to_string()))
            }
            (None, Some(category_id)) => PostQuery::new().in_category(category_id),
            (None, None) => PostQuery::new(),
        };
        self.run(query.ordered_by(PostOrder::Oldest)).await
    }

    async fn run(&self, query: PostQuery) -> Result<Vec<PostDetail>, DomainError> {
        let posts = bounded(self.timeout, "find posts", self.posts.find(&query)).await?;
        self.resolver.details(posts).await
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_size() {
        assert_eq!(parse_page_size(None).unwrap(), None);
        assert_eq!(parse_page_size(Some("10")).unwrap(), Some(10));
        assert_eq!(parse_page_size(Some(" 3 ")).unwrap(), Some(3));
        // Sign is checked by `popular`, not by the parser.
        assert_eq!(parse_page_size(Some("-1")).unwrap(), Some(-1));
        assert!(matches!(
            parse_page_size(Some("ten")),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_page_size(Some("")),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  rust ")), Some("rust"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
