use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde_json::Map;
use serde_json::Value;

use super::claims::TokenClaims;
use super::errors::TokenError;

/// Signed, time-limited bearer token codec.
///
/// Tokens are compact JWTs signed with a symmetric secret fixed at
/// construction. Uses HS256 (HMAC with SHA-256) by default.
///
/// Expiration is checked against the `now` passed by the caller rather than
/// the library's wall clock, so decoding is a pure function of
/// (token, secret, now).
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a new token codec with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// TokenCodec instance configured with HS256 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Create a token codec with an explicit HMAC algorithm.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Algorithm is not HS256, HS384 or HS512
    pub fn with_algorithm(secret: &[u8], algorithm: Algorithm) -> Result<Self, TokenError> {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(Self {
                algorithm,
                ..Self::new(secret)
            }),
            other => Err(TokenError::UnsupportedAlgorithm(format!("{:?}", other))),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Issue a signed token for `subject`, valid until `now + ttl`.
    ///
    /// # Arguments
    /// * `subject` - Identifier carried in the `sub` claim
    /// * `now` - Issuance time
    /// * `ttl` - Token lifetime
    ///
    /// # Returns
    /// Encoded token string
    ///
    /// # Errors
    /// * `InvalidTtl` - `ttl` is shorter than one second or overflows `now`
    /// * `Encoding` - Token encoding failed
    pub fn issue(
        &self,
        subject: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let expires_at = Self::expiration(now, ttl)?;

        let claims = TokenClaims::new(subject, expires_at.timestamp());
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key).map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Expiration of a token issued at `now` with lifetime `ttl`, truncated
    /// to whole seconds as carried in the `exp` claim.
    ///
    /// `exp` has one-second resolution, so a lifetime under one second could
    /// yield a token that is already expired when issued.
    ///
    /// # Errors
    /// * `InvalidTtl` - `ttl` is shorter than one second or overflows `now`
    pub fn expiration(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, TokenError> {
        if ttl < Duration::seconds(1) {
            return Err(TokenError::InvalidTtl);
        }

        let exp = now
            .checked_add_signed(ttl)
            .ok_or(TokenError::InvalidTtl)?
            .timestamp();

        DateTime::from_timestamp(exp, 0).ok_or(TokenError::InvalidTtl)
    }

    /// Verify and decode a token at time `now`.
    ///
    /// # Arguments
    /// * `token` - Token string to decode
    /// * `now` - Verification time
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `MalformedToken` - Token is structurally invalid or has no usable `exp`
    /// * `BadSignature` - Signature or algorithm does not match this codec
    /// * `Expired` - `exp` is at or before `now`
    /// * `MissingSubject` - `sub` is absent or not a string
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the caller's clock
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        let token_data = decode::<Map<String, Value>>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::MalformedToken(e.to_string()),
            })?;
        let payload = token_data.claims;

        let exp = payload
            .get("exp")
            .and_then(Value::as_i64)
            .ok_or_else(|| TokenError::MalformedToken("missing or non-integer exp".to_string()))?;

        if exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        let sub = payload
            .get("sub")
            .and_then(Value::as_str)
            .ok_or(TokenError::MissingSubject)?;

        Ok(TokenClaims::new(sub, exp))
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn issued_at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn sign<T: Serialize>(payload: &T) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            payload,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token")
    }

    #[test]
    fn test_issue_and_decode() {
        let codec = TokenCodec::new(SECRET);
        let now = issued_at();

        let token = codec
            .issue("user123", now, Duration::minutes(60))
            .expect("Failed to issue token");
        assert_eq!(token.split('.').count(), 3);

        let claims = codec.decode(&token, now).expect("Failed to decode token");
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.exp, now.timestamp() + 3600);
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = TokenCodec::new(SECRET);
        let now = issued_at();
        let ttl = Duration::seconds(300);

        let token = codec.issue("user123", now, ttl).expect("Failed to issue token");

        assert!(codec.decode(&token, now + ttl - Duration::seconds(1)).is_ok());
        assert_eq!(codec.decode(&token, now + ttl), Err(TokenError::Expired));
        assert_eq!(
            codec.decode(&token, now + ttl + Duration::days(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_issue_rejects_non_positive_ttl() {
        let codec = TokenCodec::new(SECRET);

        assert_eq!(
            codec.issue("user123", issued_at(), Duration::zero()),
            Err(TokenError::InvalidTtl)
        );
        assert_eq!(
            codec.issue("user123", issued_at(), Duration::seconds(-5)),
            Err(TokenError::InvalidTtl)
        );
    }

    #[test]
    fn test_issue_rejects_sub_second_ttl() {
        let codec = TokenCodec::new(SECRET);
        let now = issued_at() + Duration::milliseconds(700);

        assert_eq!(
            codec.issue("user123", now, Duration::milliseconds(500)),
            Err(TokenError::InvalidTtl)
        );

        let token = codec
            .issue("user123", now, Duration::seconds(1))
            .expect("Failed to issue token");
        assert!(codec.decode(&token, now).is_ok());
    }

    #[test]
    fn test_issue_rejects_overflowing_ttl() {
        let codec = TokenCodec::new(SECRET);

        assert_eq!(
            codec.issue("user123", issued_at(), Duration::days(200_000_000)),
            Err(TokenError::InvalidTtl)
        );
        assert_eq!(
            TokenCodec::expiration(issued_at(), Duration::milliseconds(i64::MAX)),
            Err(TokenError::InvalidTtl)
        );
    }

    #[test]
    fn test_expiration_is_whole_seconds() {
        let now = issued_at() + Duration::milliseconds(250);

        let expires_at = TokenCodec::expiration(now, Duration::minutes(5)).unwrap();

        assert_eq!(expires_at.timestamp(), issued_at().timestamp() + 300);
        assert_eq!(expires_at.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn test_decode_invalid_token() {
        let codec = TokenCodec::new(SECRET);

        for token in ["invalid.token.here", "", "no-dots-at-all", "a.b"] {
            assert!(matches!(
                codec.decode(token, issued_at()),
                Err(TokenError::MalformedToken(_))
            ));
        }
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let codec1 = TokenCodec::new(b"secret1_at_least_32_bytes_long_key!");
        let codec2 = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!");
        let now = issued_at();

        let token = codec1
            .issue("user123", now, Duration::hours(1))
            .expect("Failed to issue token");

        assert_eq!(codec2.decode(&token, now), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_decode_with_other_algorithm() {
        let hs512 = TokenCodec::with_algorithm(SECRET, Algorithm::HS512).expect("HMAC algorithm");
        let hs256 = TokenCodec::new(SECRET);
        let now = issued_at();

        let token = hs512
            .issue("user123", now, Duration::hours(1))
            .expect("Failed to issue token");

        assert!(hs512.decode(&token, now).is_ok());
        assert_eq!(hs256.decode(&token, now), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_with_algorithm_rejects_asymmetric() {
        let result = TokenCodec::with_algorithm(SECRET, Algorithm::RS256);

        assert!(matches!(result, Err(TokenError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let codec = TokenCodec::new(SECRET);
        let now = issued_at();
        let token = codec
            .issue("user123", now, Duration::hours(1))
            .expect("Failed to issue token");

        for position in 0..token.len() {
            if token.as_bytes()[position] == b'.' {
                continue;
            }
            let mut bytes = token.clone().into_bytes();
            bytes[position] = if bytes[position] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            let result = codec.decode(&tampered, now);
            assert!(
                matches!(
                    result,
                    Err(TokenError::BadSignature) | Err(TokenError::MalformedToken(_))
                ),
                "tampering byte {} was accepted: {:?}",
                position,
                result
            );
        }
    }

    #[test]
    fn test_missing_subject() {
        let codec = TokenCodec::new(SECRET);
        let now = issued_at();
        let exp = now.timestamp() + 60;

        let no_sub = sign(&serde_json::json!({ "exp": exp }));
        let numeric_sub = sign(&serde_json::json!({ "sub": 42, "exp": exp }));

        assert_eq!(codec.decode(&no_sub, now), Err(TokenError::MissingSubject));
        assert_eq!(codec.decode(&numeric_sub, now), Err(TokenError::MissingSubject));
    }

    #[test]
    fn test_missing_expiration() {
        let codec = TokenCodec::new(SECRET);

        let no_exp = sign(&serde_json::json!({ "sub": "user123" }));
        let text_exp = sign(&serde_json::json!({ "sub": "user123", "exp": "tomorrow" }));

        assert!(matches!(
            codec.decode(&no_exp, issued_at()),
            Err(TokenError::MalformedToken(_))
        ));
        assert!(matches!(
            codec.decode(&text_exp, issued_at()),
            Err(TokenError::MalformedToken(_))
        ));
    }
}
