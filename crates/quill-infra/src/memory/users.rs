use async_trait::async_trait;
use uuid::Uuid;

use quill_core::domain::User;
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, UserRepository};

use super::Table;

/// In-memory user repository. Email and username are unique.
pub struct InMemoryUserRepository {
    table: Table<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.table.get(id).await)
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let (email, username) = (user.email.clone(), user.username.clone());
        self.table
            .upsert(user.id, user, |other| {
                other.email == email || other.username == username
            })
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.table.remove(id).await.map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.table.find(|u| u.email == email).await)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self.table.find(|u| u.username == username).await)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .table
            .find(|u| u.email == login || u.username == login)
            .await)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        Ok(self.table.filter(|u| ids.contains(&u.id)).await)
    }

    async fn attach_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), RepoError> {
        self.table
            .modify(user_id, |u| {
                if !u.post_ids.contains(&post_id) {
                    u.post_ids.push(post_id);
                }
            })
            .await;
        Ok(())
    }

    async fn detach_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), RepoError> {
        self.table
            .modify(user_id, |u| u.post_ids.retain(|id| *id != post_id))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: &str) -> User {
        User::new(
            username.to_uppercase(),
            username.to_string(),
            email.to_string(),
            "hash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_find_by_login_accepts_email_or_username() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.save(user("ada", "ada@example.com")).await.unwrap();

        let by_email = repo.find_by_login("ada@example.com").await.unwrap();
        let by_username = repo.find_by_login("ada").await.unwrap();
        assert_eq!(by_email.unwrap().id, saved.id);
        assert_eq!(by_username.unwrap().id, saved.id);
        assert!(repo.find_by_login("grace").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_constraint_violation() {
        let repo = InMemoryUserRepository::new();
        repo.save(user("ada", "ada@example.com")).await.unwrap();

        let result = repo.save(user("ada", "other@example.com")).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_attach_post_is_idempotent() {
        let repo = InMemoryUserRepository::new();
        let saved = repo.save(user("ada", "ada@example.com")).await.unwrap();
        let post_id = Uuid::new_v4();

        repo.attach_post(saved.id, post_id).await.unwrap();
        repo.attach_post(saved.id, post_id).await.unwrap();
        let reloaded = repo.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(reloaded.post_ids, vec![post_id]);

        repo.detach_post(saved.id, post_id).await.unwrap();
        let reloaded = repo.find_by_id(saved.id).await.unwrap().unwrap();
        assert!(reloaded.post_ids.is_empty());
    }
}
