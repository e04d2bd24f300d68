use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::TokenConfig, error::AppError};

/// Token kinds this service will mint or accept. Anything else fails
/// deserialization and the token is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Mints and verifies HMAC-signed access tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity_days: i64,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validity_days: config.validity_days,
        }
    }

    pub fn issue(&self, identity_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: identity_id.to_string(),
            kind: TokenKind::Access,
            iat: now.timestamp(),
            exp: (now + Duration::days(self.validity_days)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.into()))
    }

    /// All verification failures collapse into `Unauthenticated`; callers
    /// cannot tell a bad signature from an expired or malformed token.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthenticated)
    }

    pub fn verified_identity(&self, token: &str) -> Result<Uuid, AppError> {
        let claims = self.verify(token)?;
        Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthenticated)
    }
}
