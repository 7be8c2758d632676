use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use auth::TokenSubject;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::errors::AccountIdError;
use crate::account::errors::EmailError;
use crate::account::errors::FullNameError;
use crate::account::errors::PasswordInputError;
use crate::account::errors::UsernameError;

/// Account aggregate entity.
///
/// Holds the stored credential material (`password_hash`, `refresh_token`)
/// which must never be rendered to clients.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub email: EmailAddress,
    pub full_name: FullName,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Identity claims embedded into access tokens.
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.id.to_string(),
            email: self.email.to_string(),
            username: self.username.to_string(),
            full_name: self.full_name.to_string(),
        }
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Stored trimmed and lowercased. Must be 3-32 characters and contain only
/// alphanumeric, underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new normalized username.
    ///
    /// # Arguments
    /// * `username` - Raw username string
    ///
    /// # Errors
    /// * `Blank` - Empty after trimming
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: &str) -> Result<Self, UsernameError> {
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Err(UsernameError::Blank);
        }
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Stored trimmed and lowercased, validated with an RFC 5322 parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new normalized email address.
    ///
    /// # Errors
    /// * `Blank` - Empty after trimming
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: &str) -> Result<Self, EmailError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(EmailError::Blank);
        }
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName(String);

impl FullName {
    pub fn new(full_name: &str) -> Result<Self, FullNameError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(FullNameError::Blank);
        }
        Ok(Self(full_name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plain-text password as submitted by a client.
///
/// Kept verbatim (no trimming). Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(password: &str) -> Result<Self, PasswordInputError> {
        if password.trim().is_empty() {
            return Err(PasswordInputError::Blank);
        }
        Ok(Self(password.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Identifier used to locate an account by username or email.
///
/// Values are normalized the same way stored usernames and emails are, so a
/// lookup matches regardless of the casing or padding the client sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountLookup {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl AccountLookup {
    /// Build a lookup from optional login identifiers.
    ///
    /// # Errors
    /// * `MissingIdentifier` - Neither username nor email was provided
    pub fn for_login(
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Self, AccountError> {
        let lookup = Self {
            username: normalize_identifier(username),
            email: normalize_identifier(email),
        };
        if lookup.username.is_none() && lookup.email.is_none() {
            return Err(AccountError::MissingIdentifier);
        }
        Ok(lookup)
    }

    /// Lookup matching any account that would collide with a new registration.
    pub fn for_registration(username: &Username, email: &EmailAddress) -> Self {
        Self {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
        }
    }

    pub fn matches(&self, username: &Username, email: &EmailAddress) -> bool {
        self.username.as_deref() == Some(username.as_str())
            || self.email.as_deref() == Some(email.as_str())
    }
}

fn normalize_identifier(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

impl fmt::Display for AccountLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.username, &self.email) {
            (Some(username), Some(email)) => write!(f, "{} / {}", username, email),
            (Some(username), None) => username.fmt(f),
            (None, Some(email)) => email.fmt(f),
            (None, None) => f.write_str("<none>"),
        }
    }
}

/// Command to register a new account with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub full_name: FullName,
    pub password: Password,
    /// Local path of the uploaded avatar, if one was received.
    pub avatar: Option<PathBuf>,
    pub cover_image: Option<PathBuf>,
}

/// Command to open a session with an identifier and password
#[derive(Debug)]
pub struct LoginCommand {
    pub lookup: AccountLookup,
    pub password: Password,
}

#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub old_password: Password,
    pub new_password: Password,
}

#[derive(Debug)]
pub struct UpdateAccountCommand {
    pub full_name: FullName,
    pub email: EmailAddress,
}

/// Authenticated session returned by login and refresh.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: Account,
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a successful media upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub url: String,
}

/// How a presented refresh token is checked against stored state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Token must equal the one stored on the account (single active session).
    #[default]
    MatchStored,
    /// Any token with a valid signature and expiry is accepted.
    Stateless,
}

/// Account store selected at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}
