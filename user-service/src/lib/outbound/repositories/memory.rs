use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user storage.
///
/// Used when no database is configured and by the HTTP tests. Contents are
/// lost on restart.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.values().any(|existing| existing.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| &user.email == email).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::Utc;

    use super::*;
    use crate::domain::user::models::UserName;

    fn user(email: &str, age_minutes: i64) -> User {
        User {
            id: UserId::new(),
            name: UserName::new("Someone".to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "hash".to_string(),
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repository = InMemoryUserRepository::new();
        let created = repository.create(user("a@b.com", 0)).await.unwrap();

        let by_id = repository.find_by_id(&created.id).await.unwrap();
        let by_email = repository.find_by_email(&created.email).await.unwrap();

        assert_eq!(by_id, Some(created.clone()));
        assert_eq!(by_email, Some(created));
        assert_eq!(repository.find_by_id(&UserId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let repository = InMemoryUserRepository::new();
        repository.create(user("a@b.com", 0)).await.unwrap();

        let result = repository.create(user("A@B.com", 0)).await;

        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
        assert_eq!(repository.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_all_oldest_first() {
        let repository = InMemoryUserRepository::new();
        repository.create(user("new@b.com", 1)).await.unwrap();
        repository.create(user("old@b.com", 10)).await.unwrap();
        repository.create(user("mid@b.com", 5)).await.unwrap();

        let emails: Vec<String> = repository
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email.to_string())
            .collect();

        assert_eq!(emails, vec!["old@b.com", "mid@b.com", "new@b.com"]);
    }
}
