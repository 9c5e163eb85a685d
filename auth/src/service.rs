use std::sync::Arc;
use std::sync::OnceLock;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::password::PasswordHasher;
use crate::store::Credential;
use crate::store::CredentialStore;
use crate::token::TokenCodec;
use crate::token::TokenError;

/// Token type reported to clients alongside an access token.
pub const BEARER: &str = "bearer";

// Verified against when the email is unknown so both login failures cost one Argon2 run
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

/// Authentication operation errors.
///
/// Deliberately coarse: unknown email and wrong password are the same
/// `InvalidCredentials`, and every token problem is `Unauthenticated`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid authentication credentials")]
    Unauthenticated,

    #[error("Token lifetime must be positive")]
    InvalidTtl,

    #[error("Authentication backend unavailable: {0}")]
    Unavailable(String),
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Signed bearer token
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication coordinator combining credential lookup, password
/// verification and token handling.
///
/// Holds no mutable state; share it behind an `Arc`.
pub struct AuthService<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    password_hasher: PasswordHasher,
    dummy_hash: OnceLock<Option<String>>,
    token_codec: TokenCodec,
    clock: Arc<dyn Clock>,
    token_ttl: Duration,
}

impl<S> AuthService<S>
where
    S: CredentialStore,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential lookup implementation
    /// * `token_codec` - Codec holding the signing secret
    /// * `token_ttl` - Lifetime of issued tokens
    ///
    /// # Errors
    /// * `InvalidTtl` - `token_ttl` is shorter than one second or too large
    ///   to add to the current time
    pub fn new(store: Arc<S>, token_codec: TokenCodec, token_ttl: Duration) -> Result<Self, AuthError> {
        TokenCodec::expiration(SystemClock.now(), token_ttl).map_err(|_| AuthError::InvalidTtl)?;

        Ok(Self {
            store,
            password_hasher: PasswordHasher::new(),
            dummy_hash: OnceLock::new(),
            token_codec,
            clock: Arc::new(SystemClock),
            token_ttl,
        })
    }

    /// Replace the default password hasher.
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self.dummy_hash = OnceLock::new();
        self
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// The configured hasher, for producing hashes that `login` can verify.
    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    /// Spend the same Argon2 work as a real verification.
    fn verify_dummy(&self, password: &str) {
        let dummy_hash = self
            .dummy_hash
            .get_or_init(|| match self.password_hasher.hash(DUMMY_PASSWORD) {
                Ok(hash) => Some(hash),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to prepare dummy password hash");
                    None
                }
            });

        if let Some(hash) = dummy_hash {
            self.password_hasher.verify(password, hash);
        }
    }

    /// Verify credentials and issue an access token.
    ///
    /// # Arguments
    /// * `email` - Email the user registered with
    /// * `password` - Plaintext password to verify
    ///
    /// # Returns
    /// AccessToken valid for the configured lifetime
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Unavailable` - Credential store or token encoding failed
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, AuthError> {
        let record = self.store.find_by_email(email).await.map_err(|e| {
            tracing::error!(error = %e, "Credential lookup by email failed");
            AuthError::Unavailable(e.to_string())
        })?;

        let Some(record) = record else {
            self.verify_dummy(password);
            tracing::debug!("Login rejected: no account for email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.password_hasher.verify(password, record.password_hash()) {
            tracing::debug!(subject = %record.subject(), "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let subject = record.subject();
        let expires_at = TokenCodec::expiration(now, self.token_ttl).map_err(issue_error)?;
        let access_token = self
            .token_codec
            .issue(&subject, now, self.token_ttl)
            .map_err(issue_error)?;

        tracing::info!(subject = %subject, "Access token issued");

        Ok(AccessToken {
            access_token,
            token_type: BEARER.to_string(),
            expires_at,
        })
    }

    /// Validate a bearer token and resolve its subject.
    ///
    /// # Arguments
    /// * `token` - Token string presented by the caller
    ///
    /// # Returns
    /// The credential record the token was issued for
    ///
    /// # Errors
    /// * `Unauthenticated` - Token is malformed, forged, expired, or its subject no longer exists
    /// * `Unavailable` - Credential store failed
    pub async fn authenticate(&self, token: &str) -> Result<S::Record, AuthError> {
        let claims = self
            .token_codec
            .decode(token, self.clock.now())
            .map_err(|e| {
                tracing::warn!(reason = %e, "Token rejected");
                AuthError::Unauthenticated
            })?;

        let record = self.store.find_by_id(&claims.sub).await.map_err(|e| {
            tracing::error!(error = %e, "Credential lookup by id failed");
            AuthError::Unavailable(e.to_string())
        })?;

        record.ok_or_else(|| {
            tracing::warn!(subject = %claims.sub, "Token subject no longer exists");
            AuthError::Unauthenticated
        })
    }
}

fn issue_error(err: TokenError) -> AuthError {
    match err {
        TokenError::InvalidTtl => AuthError::InvalidTtl,
        other => {
            tracing::error!(error = %other, "Token issuance failed");
            AuthError::Unavailable(other.to_string())
        }
    }
}
