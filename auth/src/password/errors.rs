use thiserror::Error;

/// Error type for password operations.
///
/// Verification never produces an error: an unreadable hash simply does not match.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hashing parameters: {0}")]
    InvalidParams(String),
}
