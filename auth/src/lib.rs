//! Authentication core library
//!
//! Provides the credential and token handling used by the user service:
//! - Password hashing (Argon2id)
//! - Signed, expiring bearer tokens (JWT, HMAC)
//! - Login and token authentication against a pluggable credential store
//!
//! The library never writes user records. Services adapt their own
//! repositories to [`CredentialStore`] and map [`AuthError`] to their
//! transport.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("not_my_password", &hash));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenCodec, TokenError};
//! use chrono::{Duration, Utc};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let now = Utc::now();
//! let token = codec.issue("user123", now, Duration::minutes(60)).unwrap();
//!
//! let claims = codec.decode(&token, now).unwrap();
//! assert_eq!(claims.sub, "user123");
//!
//! let later = now + Duration::minutes(60);
//! assert_eq!(codec.decode(&token, later), Err(TokenError::Expired));
//! ```

pub mod clock;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

// Re-export commonly used items
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordParams;
pub use service::AccessToken;
pub use service::AuthError;
pub use service::AuthService;
pub use store::Credential;
pub use store::CredentialStore;
pub use store::StoreError;
pub use token::TokenClaims;
pub use token::TokenCodec;
pub use token::TokenError;

/// Re-exported so callers can configure [`TokenCodec::with_algorithm`].
pub use jsonwebtoken::Algorithm;
