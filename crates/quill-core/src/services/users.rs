use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::bounded;
use crate::domain::User;
use crate::error::DomainError;
use crate::ports::UserRepository;

/// Account lookups and registration. Emails are stored lowercased; usernames
/// are matched as given.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    timeout: Duration,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, timeout: Duration) -> Self {
        Self { users, timeout }
    }

    /// Persist a new account. A taken email or username is a conflict.
    pub async fn register(&self, mut user: User) -> Result<User, DomainError> {
        user.email = user.email.trim().to_lowercase();
        user.username = user.username.trim().to_string();

        let by_email = bounded(
            self.timeout,
            "find user by email",
            self.users.find_by_email(&user.email),
        )
        .await?;
        if by_email.is_some() {
            return Err(DomainError::Conflict("Email already registered".to_string()));
        }

        let by_username = bounded(
            self.timeout,
            "find user by username",
            self.users.find_by_username(&user.username),
        )
        .await?;
        if by_username.is_some() {
            return Err(DomainError::Conflict("Username already taken".to_string()));
        }

        let saved = bounded(self.timeout, "save user", self.users.save(user)).await?;
        tracing::info!(user_id = %saved.id, username = %saved.username, "User registered");
        Ok(saved)
    }

    /// Find the account a login names, by email or by username.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<User>, DomainError> {
        let login = login.trim();
        let login = if login.contains('@') {
            login.to_lowercase()
        } else {
            login.to_string()
        };

        bounded(
            self.timeout,
            "find user by login",
            self.users.find_by_login(&login),
        )
        .await
    }

    pub async fn get(&self, id: Uuid) -> Result<User, DomainError> {
        bounded(self.timeout, "load user", self.users.find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }
}
