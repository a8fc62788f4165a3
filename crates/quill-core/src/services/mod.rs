//! Services - use cases built on top of the ports.

mod categories;
mod post_queries;
mod posts;
mod resolve;
mod users;

use std::future::Future;
use std::time::Duration;

use crate::error::{DomainError, RepoError};

pub use categories::CategoryService;
pub use post_queries::{
    DEFAULT_POPULAR_SIZE, PostQueryService, RELATED_LIMIT, parse_page_size,
};
pub use posts::PostService;
pub use resolve::Resolver;
pub use users::UserService;

/// Per-call bound applied to every persistence operation.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Await a repository call, failing with `Unavailable` once `limit` elapses.
pub(crate) async fn bounded<T, F>(
    limit: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, RepoError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(DomainError::from),
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Persistence call timed out"
            );
            Err(DomainError::Unavailable(format!(
                "{operation} timed out after {}ms",
                limit.as_millis()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_results_through() {
        let ok = bounded(Duration::from_millis(50), "noop", async { Ok::<_, RepoError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = bounded(Duration::from_millis(50), "noop", async {
            Err::<(), _>(RepoError::Connection("refused".to_string()))
        })
        .await;
        assert!(matches!(err, Err(DomainError::Unavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, RepoError>(())
        };
        let result = bounded(Duration::from_millis(10), "slow", slow).await;
        assert!(matches!(result, Err(DomainError::Unavailable(_))));
    }
}
