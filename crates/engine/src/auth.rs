//! Bearer tokens and password hashing.
//!
//! Tokens are HS256 JWTs carrying the user id (`sub`) and an expiry. They
//! are never stored: validity is decided by the signature and `exp` alone.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Message shared by every token failure.
pub(crate) const INVALID_TOKEN: &str = "Invalid or expired token";

/// Authentication settings handed to the engine builder.
#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl: Duration::days(DEFAULT_TOKEN_TTL_DAYS),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    #[must_use]
    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// bcrypt work factor (4..=31).
    #[must_use]
    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signing material derived from [`AuthConfig`].
pub(crate) struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    bcrypt_cost: u32,
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("ttl", &self.ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl TokenKeys {
    pub(crate) fn from_config(config: &AuthConfig) -> ResultEngine<Self> {
        if config.secret.is_empty() {
            return Err(EngineError::Internal(
                "token secret must not be empty".to_string(),
            ));
        }
        if !(4..=31).contains(&config.bcrypt_cost) {
            return Err(EngineError::Internal(format!(
                "invalid bcrypt cost: {}",
                config.bcrypt_cost
            )));
        }
        if config.token_ttl <= Duration::zero() {
            return Err(EngineError::Internal(
                "token ttl must be positive".to_string(),
            ));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: config.token_ttl,
            bcrypt_cost: config.bcrypt_cost,
        })
    }

    pub(crate) fn issue(&self, user_id: Uuid) -> ResultEngine<String> {
        self.issue_at(user_id, Utc::now())
    }

    pub(crate) fn issue_at(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> ResultEngine<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| EngineError::Internal(format!("failed to sign token: {err}")))
    }

    /// Check signature and expiry and return the user id in `sub`.
    pub(crate) fn decode(&self, token: &str) -> ResultEngine<Uuid> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |err| {
                tracing::warn!("token rejected: {err}");
                EngineError::Auth(INVALID_TOKEN.to_string())
            },
        )?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| EngineError::Auth(INVALID_TOKEN.to_string()))
    }

    pub(crate) async fn hash_password(&self, password: &str) -> ResultEngine<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|err| EngineError::Internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| EngineError::Internal(format!("password hashing failed: {err}")))
    }

    pub(crate) async fn verify_password(&self, password: &str, hash: &str) -> ResultEngine<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|err| EngineError::Internal(format!("password check task failed: {err}")))?
            .map_err(|err| EngineError::Internal(format!("password check failed: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::from_config(&AuthConfig::new(secret).bcrypt_cost(4)).unwrap()
    }

    #[test]
    fn token_round_trip() {
        let keys = keys("secret");
        let user_id = Uuid::new_v4();

        let token = keys.issue(user_id).unwrap();
        assert_eq!(keys.decode(&token).unwrap(), user_id);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let keys = keys("secret");
        let token = keys
            .issue_at(Uuid::new_v4(), Utc::now() - Duration::days(8))
            .unwrap();

        assert_eq!(
            keys.decode(&token),
            Err(EngineError::Auth(INVALID_TOKEN.to_string()))
        );
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let token = keys("one").issue(Uuid::new_v4()).unwrap();
        assert!(matches!(keys("two").decode(&token), Err(EngineError::Auth(_))));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let keys = keys("secret");
        assert!(matches!(keys.decode(""), Err(EngineError::Auth(_))));
        assert!(matches!(keys.decode("not.a.jwt"), Err(EngineError::Auth(_))));
    }

    #[test]
    fn config_is_checked() {
        assert!(TokenKeys::from_config(&AuthConfig::new("")).is_err());
        assert!(TokenKeys::from_config(&AuthConfig::new("s").bcrypt_cost(2)).is_err());
        assert!(
            TokenKeys::from_config(&AuthConfig::new("s").token_ttl(Duration::zero())).is_err()
        );
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let rendered = format!("{:?}", AuthConfig::new("hunter2"));
        assert!(!rendered.contains("hunter2"));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let keys = keys("secret");
        let hash = keys.hash_password("secret1").await.unwrap();

        assert_ne!(hash, "secret1");
        assert!(keys.verify_password("secret1", &hash).await.unwrap());
        assert!(!keys.verify_password("secret2", &hash).await.unwrap());
    }
}
