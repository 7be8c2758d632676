use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::JwtError;

/// Identity carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub id: String,
    pub email: String,
    pub username: String,
    pub full_name: String,
}

/// Payload of an access token.
///
/// Carries the full identity so downstream authorization checks need no store
/// lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Account identifier
    pub sub: String,
    pub email: String,
    pub username: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Build access claims for `subject`, valid for `lifetime` from `issued_at`.
    ///
    /// # Errors
    /// * `EncodingFailed` - The expiry falls outside the representable time range
    pub fn new(
        subject: &TokenSubject,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, JwtError> {
        Ok(Self {
            sub: subject.id.clone(),
            email: subject.email.clone(),
            username: subject.username.clone(),
            full_name: subject.full_name.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at(issued_at, lifetime)?,
        })
    }
}

/// Payload of a refresh token. Only the account id; the token exists solely to
/// mint new access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    /// Account identifier
    pub sub: String,
    /// Unique token id, so two refresh tokens issued within the same second differ
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl RefreshClaims {
    /// Build refresh claims for account `id`, valid for `lifetime` from `issued_at`.
    ///
    /// # Errors
    /// * `EncodingFailed` - The expiry falls outside the representable time range
    pub fn new(
        id: impl ToString,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, JwtError> {
        Ok(Self {
            sub: id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at(issued_at, lifetime)?,
        })
    }
}

fn expires_at(issued_at: DateTime<Utc>, lifetime: Duration) -> Result<i64, JwtError> {
    issued_at
        .checked_add_signed(lifetime)
        .map(|expiry| expiry.timestamp())
        .ok_or_else(|| JwtError::EncodingFailed("token expiry out of range".to_string()))
}
