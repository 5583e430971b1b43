pub mod permissions;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use permissions::{Capability, Permissions};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: Some(now.timestamp()),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("JWT rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),

    #[error("JWT subject is not a user id: {0}")]
    InvalidSubject(String),
}

/// HS512 signing and verification keys derived from the startup secret
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn from_secret(secret: &str) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS512);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, JwtError> {
        self.issue_claims(&Claims::new(user_id, ttl))
    }

    pub fn issue_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS512), claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Check signature, algorithm and expiry, and return the subject's user id
    pub fn verify(&self, token: &str) -> Result<Uuid, JwtError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| JwtError::InvalidSubject(data.claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::from_secret(secret).unwrap()
    }

    #[test]
    fn valid_token_resolves_its_subject() {
        let id = Uuid::new_v4();
        let token = keys("secret").issue(id, Duration::hours(1)).unwrap();
        assert_eq!(keys("secret").verify(&token).unwrap(), id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = keys("secret");
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            exp: Utc::now().timestamp() - 10,
            iat: None,
        };
        let token = keys.issue_claims(&claims).unwrap();
        assert!(matches!(keys.verify(&token), Err(JwtError::Rejected(_))));
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let token = keys("secret").issue(Uuid::new_v4(), Duration::hours(1)).unwrap();
        assert!(keys("another secret").verify(&token).is_err());
    }

    #[test]
    fn token_without_expiry_is_rejected() {
        let claims = json!({ "sub": Uuid::new_v4().to_string() });
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(keys("secret").verify(&token).is_err());
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let claims = Claims::new(Uuid::new_v4(), Duration::hours(1));
        let token = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        assert!(keys("secret").verify(&token).is_err());
    }

    #[test]
    fn subject_must_be_a_uuid() {
        let keys = keys("secret");
        let claims = Claims {
            sub: "admin".to_string(),
            exp: Utc::now().timestamp() + 60,
            iat: None,
        };
        let token = keys.issue_claims(&claims).unwrap();
        assert!(matches!(keys.verify(&token), Err(JwtError::InvalidSubject(_))));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenKeys::from_secret(""), Err(JwtError::InvalidSecret)));
    }
}
