//! JWT issuance and verification.
//!
//! Tokens are HMAC-SHA256 signed and live for 30 minutes. Claims carry
//! the account id, every assigned role, and — when a domain row links
//! back to the account — the role-resolved `userSpecificId` the clients
//! use to scope their own queries. There is no refresh mechanism.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed token lifetime.
pub const TOKEN_LIFETIME_MINUTES: i64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token rejected: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Claim set embedded in every issued token.
///
/// JSON objects cannot repeat keys, so "one claim per role" is carried
/// as a `role` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    /// Identity-account id.
    pub id: String,
    #[serde(default)]
    pub role: Vec<String>,
    /// Domain-specific id (patient/doctor/admin row id). Omitted when no
    /// domain row matches the account.
    #[serde(rename = "userSpecificId", skip_serializing_if = "Option::is_none")]
    pub user_specific_id: Option<String>,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.iter().any(|r| r == role)
    }
}

/// Signing configuration, built once at startup from `AppConfig`.
#[derive(Clone)]
pub struct AuthConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
}

impl AuthConfig {
    pub fn new(secret: &str, issuer: &str, audience: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        }
    }

    /// Issue a token for an authenticated account.
    pub fn issue(
        &self,
        account_id: &str,
        subject: &str,
        roles: Vec<String>,
        user_specific_id: Option<i64>,
    ) -> Result<String, AuthError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat,
            exp: iat + TOKEN_LIFETIME_MINUTES * 60,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            id: account_id.to_string(),
            role: roles,
            user_specific_id: user_specific_id.map(|id| id.to_string()),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify a token's signature, expiry, issuer, and audience.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}
