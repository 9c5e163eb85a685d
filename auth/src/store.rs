use async_trait::async_trait;
use thiserror::Error;

/// A stored credential as seen by the authentication core.
pub trait Credential {
    /// Identifier placed in the token `sub` claim.
    fn subject(&self) -> String;

    /// Stored password hash in PHC string format.
    fn password_hash(&self) -> &str;
}

/// Failure of the backing store (connection lost, query failed, ...).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Credential store unavailable: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(message: impl ToString) -> Self {
        Self(message.to_string())
    }
}

/// Read-only access to credential records.
///
/// Implementations must be safe for concurrent use. The core never writes
/// through this port.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    type Record: Credential + Send;

    /// Retrieve a credential record by email address.
    ///
    /// # Returns
    /// Optional record (None if no user has this email)
    ///
    /// # Errors
    /// * `StoreError` - Backing store failed
    async fn find_by_email(&self, email: &str) -> Result<Option<Self::Record>, StoreError>;

    /// Retrieve a credential record by subject identifier.
    ///
    /// An identifier the store cannot parse is reported as `None`.
    ///
    /// # Returns
    /// Optional record (None if not found)
    ///
    /// # Errors
    /// * `StoreError` - Backing store failed
    async fn find_by_id(&self, id: &str) -> Result<Option<Self::Record>, StoreError>;
}
