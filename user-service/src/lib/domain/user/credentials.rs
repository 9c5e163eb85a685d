use std::sync::Arc;

use async_trait::async_trait;
use auth::Credential;
use auth::CredentialStore;
use auth::StoreError;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

impl Credential for User {
    fn subject(&self) -> String {
        self.id.to_string()
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

/// Exposes a user repository to the authentication core.
///
/// Identifiers and emails that fail validation are reported as missing
/// records; only repository failures surface as `StoreError`.
pub struct UserCredentials<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
}

impl<UR> UserCredentials<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>) -> Self {
        Self { repository }
    }
}

fn store_error(err: UserError) -> StoreError {
    StoreError::new(err)
}

#[async_trait]
impl<UR> CredentialStore for UserCredentials<UR>
where
    UR: UserRepository,
{
    type Record = User;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let Ok(email) = EmailAddress::new(email.to_string()) else {
            return Ok(None);
        };

        self.repository
            .find_by_email(&email)
            .await
            .map_err(store_error)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let Ok(id) = UserId::from_string(id) else {
            return Ok(None);
        };

        self.repository.find_by_id(&id).await.map_err(store_error)
    }
}
