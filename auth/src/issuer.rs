use chrono::Duration;
use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::jwt::AccessClaims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::RefreshClaims;
use crate::jwt::TokenSubject;

/// Issues and verifies the two session token types.
///
/// Access and refresh tokens are signed with different secrets and have
/// independent lifetimes, so a leaked key can only mint its own token type.
/// Tokens are stateless: the issuer keeps no record of what it has issued.
pub struct TokenIssuer {
    access: JwtHandler,
    refresh: JwtHandler,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl TokenIssuer {
    /// Create a token issuer.
    ///
    /// # Arguments
    /// * `access_secret` - Signing secret for access tokens
    /// * `access_lifetime` - Validity window of access tokens
    /// * `refresh_secret` - Signing secret for refresh tokens
    /// * `refresh_lifetime` - Validity window of refresh tokens
    ///
    /// # Errors
    /// * `InvalidKey` - A secret is empty or both token types share one secret
    /// * `InvalidLifetime` - A lifetime is not positive, or access tokens outlive refresh tokens
    pub fn new(
        access_secret: &[u8],
        access_lifetime: Duration,
        refresh_secret: &[u8],
        refresh_lifetime: Duration,
    ) -> Result<Self, JwtError> {
        if access_secret.is_empty() || refresh_secret.is_empty() {
            return Err(JwtError::InvalidKey("signing secret is empty".to_string()));
        }
        if access_secret == refresh_secret {
            return Err(JwtError::InvalidKey(
                "access and refresh tokens must use distinct secrets".to_string(),
            ));
        }

        if access_lifetime <= Duration::zero() || refresh_lifetime <= Duration::zero() {
            return Err(JwtError::InvalidLifetime(
                "token lifetimes must be positive".to_string(),
            ));
        }
        if access_lifetime > refresh_lifetime {
            return Err(JwtError::InvalidLifetime(
                "access tokens must not outlive refresh tokens".to_string(),
            ));
        }

        Ok(Self {
            access: JwtHandler::new(access_secret),
            refresh: JwtHandler::new(refresh_secret),
            access_lifetime,
            refresh_lifetime,
        })
    }

    pub fn access_lifetime(&self) -> Duration {
        self.access_lifetime
    }

    pub fn refresh_lifetime(&self) -> Duration {
        self.refresh_lifetime
    }

    /// Sign a short-lived access token carrying the full identity.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed or the expiry is out of range
    pub fn issue_access_token(&self, subject: &TokenSubject) -> Result<String, JwtError> {
        let claims = AccessClaims::new(subject, Utc::now(), self.access_lifetime)?;
        self.access.encode(&claims)
    }

    /// Sign a long-lived refresh token carrying only the account id.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed or the expiry is out of range
    pub fn issue_refresh_token(&self, id: &str) -> Result<String, JwtError> {
        let claims = RefreshClaims::new(id, Utc::now(), self.refresh_lifetime)?;
        self.refresh.encode(&claims)
    }

    /// Verify an access token with the access secret.
    ///
    /// # Errors
    /// * `TokenExpired` - Token lifetime has elapsed
    /// * `InvalidToken` - Bad signature or malformed token
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        self.access.decode(token)
    }

    /// Verify a refresh token with the refresh secret.
    ///
    /// Signature and expiry only. Whether the token is still the account's
    /// current one is a separate check made by the caller.
    ///
    /// # Errors
    /// * `TokenExpired` - Token lifetime has elapsed
    /// * `InvalidToken` - Bad signature or malformed token
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.refresh.decode(token)
    }

    /// Verify any token against an explicit secret.
    ///
    /// # Errors
    /// * `TokenExpired` - Token lifetime has elapsed
    /// * `InvalidToken` - Bad signature or malformed token
    pub fn verify<T: DeserializeOwned>(token: &str, secret: &[u8]) -> Result<T, JwtError> {
        JwtHandler::new(secret).decode(token)
    }
}
