use std::path::Path;

use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountLookup;
use crate::account::models::ChangePasswordCommand;
use crate::account::models::EmailAddress;
use crate::account::models::FullName;
use crate::account::models::LoginCommand;
use crate::account::models::RegisterCommand;
use crate::account::models::Session;
use crate::account::models::UpdateAccountCommand;
use crate::account::models::UploadedMedia;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// # Arguments
    /// * `command` - Validated registration fields and local media paths
    ///
    /// # Returns
    /// Created account
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `AvatarRequired` - No avatar file was received
    /// * `AvatarUploadFailed` - Media host did not accept the avatar
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Account, AccountError>;

    /// Verify credentials and open a session.
    ///
    /// # Returns
    /// Session holding the account and a freshly issued token pair
    ///
    /// # Errors
    /// * `NotFound` - No account matches the identifier
    /// * `InvalidCredentials` - Password does not match
    /// * `TokenSigning` - Token issuance failed
    async fn login(&self, command: LoginCommand) -> Result<Session, AccountError>;

    /// Revoke the stored refresh token. Succeeds if already revoked.
    ///
    /// # Errors
    /// * `NotFound` - Account no longer exists
    async fn logout(&self, id: &AccountId) -> Result<(), AccountError>;

    /// Exchange a refresh token for a new token pair.
    ///
    /// # Errors
    /// * `InvalidRefreshToken` - Signature, expiry or subject is invalid
    /// * `RefreshTokenRevoked` - Token does not match the stored one
    async fn refresh(&self, refresh_token: &str) -> Result<Session, AccountError>;

    /// Replace the password after verifying the current one.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `InvalidCredentials` - Current password does not match
    async fn change_password(
        &self,
        id: &AccountId,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError>;

    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError>;

    /// Update full name and email.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `EmailAlreadyExists` - Email belongs to another account
    async fn update_details(
        &self,
        id: &AccountId,
        command: UpdateAccountCommand,
    ) -> Result<Account, AccountError>;
}

/// Persistence operations for account aggregate.
///
/// Mutating operations stamp `updated_at` and return the stored account.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist new account to storage.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, account: Account) -> Result<Account, AccountError>;

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve the first account whose username or email matches the lookup.
    async fn find_by_username_or_email(
        &self,
        lookup: &AccountLookup,
    ) -> Result<Option<Account>, AccountError>;

    /// Store or clear the refresh token.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn set_refresh_token(
        &self,
        id: &AccountId,
        refresh_token: Option<String>,
    ) -> Result<Account, AccountError>;

    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn update_password_hash(
        &self,
        id: &AccountId,
        password_hash: String,
    ) -> Result<Account, AccountError>;

    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `EmailAlreadyExists` - Email belongs to another account
    async fn update_details(
        &self,
        id: &AccountId,
        full_name: &FullName,
        email: &EmailAddress,
    ) -> Result<Account, AccountError>;
}

/// Uploads local files to a remote media host.
#[async_trait]
pub trait MediaUploader: Send + Sync + 'static {
    /// Upload the file at `path`.
    ///
    /// # Returns
    /// Public location of the stored file, or `None` when the upload failed.
    /// Failures are logged by the adapter, never raised.
    async fn upload(&self, path: &Path) -> Option<UploadedMedia>;
}
