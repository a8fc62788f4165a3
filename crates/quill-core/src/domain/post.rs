use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthorSummary, CategorySummary};

/// Number of content characters kept in a summary excerpt.
pub const EXCERPT_CHARS: usize = 160;

/// Publication status of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Pending,
    Review,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Pending => "pending",
            PostStatus::Review => "review",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "pending" => Ok(PostStatus::Pending),
            "review" => Ok(PostStatus::Review),
            other => Err(format!("unknown post status '{other}'")),
        }
    }
}

/// A comment embedded in a post. Never edited or deleted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            author_id,
            created_at: Utc::now(),
        }
    }
}

/// Post entity - a blog article with its embedded comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_url: String,
    pub is_featured: bool,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub category_ids: Vec<Uuid>,
    /// User references. Duplicates are kept and counted.
    pub likes: Vec<Uuid>,
    pub views: u64,
    /// Most recent first.
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub is_featured: bool,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub category_ids: Vec<Uuid>,
}

/// Partial update of a post. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub is_featured: Option<bool>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
    pub category_ids: Option<Vec<Uuid>>,
}

impl Post {
    /// Create a new post owned by `author_id` with an already-resolved slug.
    pub fn new(author_id: Uuid, new: NewPost, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: new.title,
            slug,
            content: new.content,
            image_url: new.image_url,
            is_featured: new.is_featured,
            status: new.status,
            tags: new.tags,
            category_ids: new.category_ids,
            likes: Vec::new(),
            views: 0,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Returns a copy with `changes` applied. The slug is left as-is; callers
    /// recompute it when the title moved.
    pub fn with_changes(&self, changes: PostChanges) -> Post {
        let mut next = self.clone();
        if let Some(title) = changes.title {
            next.title = title;
        }
        if let Some(content) = changes.content {
            next.content = content;
        }
        if let Some(image_url) = changes.image_url {
            next.image_url = image_url;
        }
        if let Some(is_featured) = changes.is_featured {
            next.is_featured = is_featured;
        }
        if let Some(status) = changes.status {
            next.status = status;
        }
        if let Some(tags) = changes.tags {
            next.tags = tags;
        }
        if let Some(category_ids) = changes.category_ids {
            next.category_ids = category_ids;
        }
        next.updated_at = Utc::now();
        next
    }

    pub fn with_slug(mut self, slug: String) -> Post {
        self.slug = slug;
        self
    }

    /// Returns a copy with `comment` at the front of the comment list.
    pub fn with_comment(&self, comment: Comment) -> Post {
        let mut next = self.clone();
        next.comments.insert(0, comment);
        next.updated_at = Utc::now();
        next
    }

    pub fn excerpt(&self) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
        if chars.next().is_some() {
            format!("{}...", head.trim_end())
        } else {
            head
        }
    }

    pub fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: self.excerpt(),
            image_url: self.image_url.clone(),
            like_count: self.like_count(),
            views: self.views,
            created_at: self.created_at,
        }
    }
}

/// Projection returned by the popularity ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub image_url: String,
    pub like_count: usize,
    pub views: u64,
    pub created_at: DateTime<Utc>,
}

/// A post with its author and categories resolved for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<AuthorSummary>,
    pub categories: Vec<CategorySummary>,
}
