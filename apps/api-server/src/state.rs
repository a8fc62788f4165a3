//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use quill_core::ports::{CategoryRepository, PostRepository, UserRepository};
use quill_core::services::{
    CategoryService, PostQueryService, PostService, Resolver, UserService,
};
use quill_infra::{InMemoryCategoryRepository, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use quill_infra::{
    DatabaseConfig, PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
    database::connect,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub queries: Arc<PostQueryService>,
    pub categories: Arc<CategoryService>,
    pub users: Arc<UserService>,
}

/// The three repositories every service is built from.
pub(crate) struct Repositories {
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            posts: Arc::new(InMemoryPostRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    async fn connect(config: Option<&DatabaseConfig>) -> Self {
        let Some(config) = config else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        match connect(config).await {
            Ok(db) => Self {
                posts: Arc::new(PostgresPostRepository::new(db.clone())),
                users: Arc::new(PostgresUserRepository::new(db.clone())),
                categories: Arc::new(PostgresCategoryRepository::new(db)),
            },
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory()
            }
        }
    }
}

impl AppState {
    /// Build the application state, falling back to in-memory storage when no
    /// database is reachable.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let repos = Repositories::connect(config.database.as_ref()).await;

        #[cfg(not(feature = "postgres"))]
        let repos = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Repositories::in_memory()
        };

        let state = Self::from_repositories(repos, config.query_timeout);
        tracing::info!("Application state initialized");
        state
    }

    pub(crate) fn from_repositories(repos: Repositories, timeout: Duration) -> Self {
        let resolver = Resolver::new(repos.users.clone(), repos.categories.clone(), timeout);

        Self {
            posts: Arc::new(PostService::new(
                repos.posts.clone(),
                repos.users.clone(),
                repos.categories.clone(),
                timeout,
            )),
            queries: Arc::new(PostQueryService::new(repos.posts, resolver, timeout)),
            categories: Arc::new(CategoryService::new(repos.categories, timeout)),
            users: Arc::new(UserService::new(repos.users, timeout)),
        }
    }
}
