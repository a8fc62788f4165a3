#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use quill_core::domain::{Category, NewPost, Post, PostDetail, PostStatus, User};
use quill_core::ports::BaseRepository;
use quill_core::services::{CategoryService, PostQueryService, PostService, Resolver};
use quill_infra::{InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository};

pub const TIMEOUT: Duration = Duration::from_secs(2);

pub struct Blog {
    pub posts: Arc<InMemoryPostRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub categories: Arc<InMemoryCategoryRepository>,
    pub queries: PostQueryService,
    pub service: PostService,
    pub category_service: CategoryService,
}

impl Blog {
    pub fn new() -> Self {
        let posts = Arc::new(InMemoryPostRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let categories = Arc::new(InMemoryCategoryRepository::new());

        let resolver = Resolver::new(users.clone(), categories.clone(), TIMEOUT);
        let queries = PostQueryService::new(posts.clone(), resolver, TIMEOUT);
        let service = PostService::new(posts.clone(), users.clone(), categories.clone(), TIMEOUT);
        let category_service = CategoryService::new(categories.clone(), TIMEOUT);

        Self {
            posts,
            users,
            categories,
            queries,
            service,
            category_service,
        }
    }

    pub async fn author(&self, username: &str) -> User {
        let user = User::new(
            username.to_uppercase(),
            username.to_string(),
            format!("{username}@example.com"),
            "hash".to_string(),
        );
        self.users.save(user).await.unwrap()
    }

    pub async fn category(&self, name: &str) -> Category {
        self.category_service.create(name).await.unwrap()
    }

    /// Insert a post directly, bypassing the service, with full control over
    /// the ranking fields.
    pub async fn seed(&self, seed: Seed<'_>) -> Post {
        let mut post = Post::new(
            seed.author.unwrap_or_else(Uuid::new_v4),
            NewPost {
                title: seed.title.to_string(),
                content: seed.content.unwrap_or("Lorem ipsum").to_string(),
                status: seed.status,
                tags: seed.tags.iter().map(|t| t.to_string()).collect(),
                category_ids: seed.categories.to_vec(),
                ..Default::default()
            },
            format!("{}-{}", seed.title.to_lowercase().replace(' ', "-"), Uuid::new_v4()),
        );
        post.likes = (0..seed.likes).map(|_| Uuid::new_v4()).collect();
        post.views = seed.views;
        post.created_at = Utc::now() - chrono::Duration::minutes(seed.minutes_ago);
        self.posts.save(post).await.unwrap()
    }
}

pub struct Seed<'a> {
    pub title: &'a str,
    pub content: Option<&'a str>,
    pub author: Option<Uuid>,
    pub status: PostStatus,
    pub tags: &'a [&'a str],
    pub categories: &'a [Uuid],
    pub likes: usize,
    pub views: u64,
    pub minutes_ago: i64,
}

impl<'a> Seed<'a> {
    pub fn published(title: &'a str) -> Self {
        Self {
            title,
            content: None,
            author: None,
            status: PostStatus::Published,
            tags: &[],
            categories: &[],
            likes: 0,
            views: 0,
            minutes_ago: 0,
        }
    }

    pub fn draft(title: &'a str) -> Self {
        Self {
            status: PostStatus::Draft,
            ..Self::published(title)
        }
    }

    pub fn tags(mut self, tags: &'a [&'a str]) -> Self {
        self.tags = tags;
        self
    }

    pub fn categories(mut self, categories: &'a [Uuid]) -> Self {
        self.categories = categories;
        self
    }

    pub fn content(mut self, content: &'a str) -> Self {
        self.content = Some(content);
        self
    }

    pub fn author(mut self, author: Uuid) -> Self {
        self.author = Some(author);
        self
    }

    pub fn likes(mut self, likes: usize) -> Self {
        self.likes = likes;
        self
    }

    pub fn views(mut self, views: u64) -> Self {
        self.views = views;
        self
    }

    pub fn minutes_ago(mut self, minutes: i64) -> Self {
        self.minutes_ago = minutes;
        self
    }
}

pub fn titles(details: &[PostDetail]) -> Vec<&str> {
    details.iter().map(|d| d.post.title.as_str()).collect()
}
