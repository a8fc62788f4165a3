//! In-memory repositories.
//!
//! Used when no database is configured and as fast test doubles. Unique
//! constraints mirror the database schema so behaviour matches PostgreSQL.
//! Note: Data is lost on process restart.

mod categories;
mod posts;
mod users;

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

pub use categories::InMemoryCategoryRepository;
pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;

/// A keyed collection behind an async RwLock.
pub(crate) struct Table<T> {
    rows: RwLock<HashMap<Uuid, T>>,
}

impl<T: Clone> Table<T> {
    pub(crate) fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) async fn get(&self, id: Uuid) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    pub(crate) async fn all(&self) -> Vec<T> {
        self.rows.read().await.values().cloned().collect()
    }

    pub(crate) async fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.read().await.values().find(|row| predicate(row)).cloned()
    }

    pub(crate) async fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows
            .read()
            .await
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    /// Insert or replace `row` unless `conflicts` holds for another row.
    pub(crate) async fn upsert(
        &self,
        id: Uuid,
        row: T,
        conflicts: impl Fn(&T) -> bool,
    ) -> Result<T, quill_core::RepoError> {
        let mut rows = self.rows.write().await;
        if rows
            .iter()
            .any(|(other_id, other)| *other_id != id && conflicts(other))
        {
            return Err(quill_core::RepoError::Constraint(
                "Entity already exists".to_string(),
            ));
        }
        rows.insert(id, row.clone());
        Ok(row)
    }

    pub(crate) async fn remove(&self, id: Uuid) -> Option<T> {
        self.rows.write().await.remove(&id)
    }

    /// Mutate a row in place unless another row conflicts. Returns the
    /// updated row, or `None` when it is absent.
    pub(crate) async fn update(
        &self,
        id: Uuid,
        conflicts: impl Fn(&T) -> bool,
        change: impl FnOnce(&mut T),
    ) -> Result<Option<T>, quill_core::RepoError> {
        let mut rows = self.rows.write().await;
        if rows
            .iter()
            .any(|(other_id, other)| *other_id != id && conflicts(other))
        {
            return Err(quill_core::RepoError::Constraint(
                "Entity already exists".to_string(),
            ));
        }
        Ok(rows.get_mut(&id).map(|row| {
            change(row);
            row.clone()
        }))
    }

    /// Mutate a row in place. Returns false when the row is absent.
    pub(crate) async fn modify(&self, id: Uuid, change: impl FnOnce(&mut T)) -> bool {
        match self.rows.write().await.get_mut(&id) {
            Some(row) => {
                change(row);
                true
            }
            None => false,
        }
    }
}
