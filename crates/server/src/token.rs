//! Bearer tokens: HS256 JWTs carrying the user id.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::ServerError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: i32,
    exp: i64,
}

/// Signing and verification keys derived from the shared secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i32) -> Result<String, ServerError> {
        let claims = Claims {
            id: user_id,
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| ServerError::Internal(format!("token encoding failed: {err}")))
    }

    /// User id of a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Option<i32> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims.id),
            Err(err) => {
                tracing::debug!("rejected bearer token: {err}");
                None
            }
        }
    }
}
