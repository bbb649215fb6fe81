use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT claims carried by API tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails when `expiry_hours` pushes `exp` past the representable range
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|validity| now.checked_add_signed(validity))
            .ok_or_else(|| {
                JwtError::TokenGeneration(format!("token lifetime of {} hours is out of range", expiry_hours))
            })?;

        Ok(Self {
            sub: user_id,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret is empty")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

/// HS256 signing and verification keys derived from the configured secret
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn generate(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }
}

/// Sign a token for `user_id` valid for `expiry_hours`
pub fn issue_token(keys: &JwtKeys, user_id: Uuid, expiry_hours: u64) -> Result<String, JwtError> {
    keys.generate(&Claims::new(user_id, expiry_hours)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_validates_with_same_secret() {
        let keys = JwtKeys::from_secret("unit-test-secret").unwrap();
        let user_id = Uuid::new_v4();

        let token = issue_token(&keys, user_id, 1).unwrap();
        let claims = keys.validate(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let keys = JwtKeys::from_secret("unit-test-secret").unwrap();
        let other = JwtKeys::from_secret("someone-else").unwrap();

        let token = issue_token(&other, Uuid::new_v4(), 1).unwrap();
        assert!(matches!(keys.validate(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::from_secret("unit-test-secret").unwrap();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 7200,
            exp: now - 3600,
        };

        let token = keys.generate(&claims).unwrap();
        assert!(keys.validate(&token).is_err());
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        let keys = JwtKeys::from_secret("unit-test-secret").unwrap();

        for hours in [u64::MAX, i64::MAX as u64, 1 << 40] {
            let err = issue_token(&keys, Uuid::new_v4(), hours).unwrap_err();
            assert!(matches!(err, JwtError::TokenGeneration(_)), "hours {}", hours);
        }
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(JwtKeys::from_secret(""), Err(JwtError::InvalidSecret)));
    }
}
