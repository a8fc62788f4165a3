use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::User;
use quill_core::services::UserService;
use quill_infra::InMemoryUserRepository;

fn service() -> UserService {
    UserService::new(
        Arc::new(InMemoryUserRepository::new()),
        Duration::from_secs(2),
    )
}

fn account(username: &str, email: &str) -> User {
    User::new(
        "Ada Lovelace".to_string(),
        username.to_string(),
        email.to_string(),
        "hash".to_string(),
    )
}

#[tokio::test]
async fn register_normalises_email_and_username() {
    let users = service();

    let saved = users
        .register(account(" ada ", " Ada@Example.COM "))
        .await
        .unwrap();

    assert_eq!(saved.username, "ada");
    assert_eq!(saved.email, "ada@example.com");
    assert_eq!(users.get(saved.id).await.unwrap().id, saved.id);
}

#[tokio::test]
async fn register_rejects_taken_email_or_username() {
    let users = service();
    users
        .register(account("ada", "ada@example.com"))
        .await
        .unwrap();

    assert!(matches!(
        users.register(account("grace", "ADA@example.com")).await,
        Err(DomainError::Conflict(_))
    ));
    assert!(matches!(
        users.register(account("ada", "grace@example.com")).await,
        Err(DomainError::Conflict(_))
    ));
}

#[tokio::test]
async fn login_matches_email_case_insensitively_and_username_exactly() {
    let users = service();
    let ada = users
        .register(account("ada", "ada@example.com"))
        .await
        .unwrap();

    let by_email = users.find_by_login("Ada@Example.com").await.unwrap();
    assert_eq!(by_email.map(|u| u.id), Some(ada.id));

    let by_username = users.find_by_login(" ada ").await.unwrap();
    assert_eq!(by_username.map(|u| u.id), Some(ada.id));

    assert!(users.find_by_login("ADA").await.unwrap().is_none());
}

#[tokio::test]
async fn get_of_unknown_user_is_not_found() {
    assert!(matches!(
        service().get(Uuid::new_v4()).await,
        Err(DomainError::NotFound { .. })
    ));
}
