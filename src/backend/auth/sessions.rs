/**
 * Session Tokens
 *
 * HS256 bearer tokens. The signing keys are built once from the configured
 * secret and held in `AppState`; nothing here reads the environment.
 */

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::store::UserRecord;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub username: String,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Signing and verification keys plus token lifetime
#[derive(Clone)]
pub struct SessionKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            ttl,
        }
    }

    /// Create a token for a user
    pub fn issue(&self, user: &UserRecord) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}
