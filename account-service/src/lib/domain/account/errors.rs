use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username is required")]
    Blank,

    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required")]
    Blank,

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for FullName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FullNameError {
    #[error("Full name is required")]
    Blank,
}

/// Error for raw password input
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordInputError {
    #[error("Password is required")]
    Blank,
}

/// Error for media host adapters
#[derive(Debug, Clone, Error)]
pub enum MediaUploadError {
    #[error("Failed to read local file: {0}")]
    ReadFailed(String),

    #[error("Upload request failed: {0}")]
    RequestFailed(String),

    #[error("Unexpected response from media host: {0}")]
    InvalidResponse(String),
}

/// Classification of account errors, independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input; the caller must resubmit.
    Validation,
    /// Username or email already taken.
    Conflict,
    /// No matching account.
    NotFound,
    /// Wrong password or unusable token.
    Authentication,
    /// Hashing, signing or persistence failure.
    Internal,
}

/// Top-level error for all account operations
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid account ID: {0}")]
    InvalidAccountId(#[from] AccountIdError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid full name: {0}")]
    InvalidFullName(#[from] FullNameError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordInputError),

    #[error("Username or email is required")]
    MissingIdentifier,

    #[error("Avatar file is required")]
    AvatarRequired,

    #[error("Avatar file could not be uploaded")]
    AvatarUploadFailed,

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Invalid user credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token: {0}")]
    InvalidRefreshToken(String),

    #[error("Refresh token is expired or used")]
    RefreshTokenRevoked,

    // Infrastructure errors
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token signing failed: {0}")]
    TokenSigning(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AccountError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::InvalidAccountId(_)
            | AccountError::InvalidUsername(_)
            | AccountError::InvalidEmail(_)
            | AccountError::InvalidFullName(_)
            | AccountError::InvalidPassword(_)
            | AccountError::MissingIdentifier
            | AccountError::AvatarRequired
            | AccountError::AvatarUploadFailed => ErrorKind::Validation,
            AccountError::UsernameAlreadyExists(_) | AccountError::EmailAlreadyExists(_) => {
                ErrorKind::Conflict
            }
            AccountError::NotFound(_) => ErrorKind::NotFound,
            AccountError::InvalidCredentials
            | AccountError::InvalidRefreshToken(_)
            | AccountError::RefreshTokenRevoked => ErrorKind::Authentication,
            AccountError::Hashing(_)
            | AccountError::TokenSigning(_)
            | AccountError::DatabaseError(_)
            | AccountError::Unknown(_) => ErrorKind::Internal,
        }
    }
}
