use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenIssuer;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountLookup;
use crate::account::models::ChangePasswordCommand;
use crate::account::models::LoginCommand;
use crate::account::models::Password;
use crate::account::models::RefreshPolicy;
use crate::account::models::RegisterCommand;
use crate::account::models::Session;
use crate::account::models::UpdateAccountCommand;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;
use crate::account::ports::MediaUploader;

/// Domain service implementation for account and session operations.
///
/// Concrete implementation of AccountServicePort with dependency injection.
pub struct AccountService<AR, MU>
where
    AR: AccountRepository,
    MU: MediaUploader,
{
    repository: Arc<AR>,
    media_uploader: Arc<MU>,
    token_issuer: Arc<TokenIssuer>,
    password_hasher: PasswordHasher,
    refresh_policy: RefreshPolicy,
}

impl<AR, MU> AccountService<AR, MU>
where
    AR: AccountRepository,
    MU: MediaUploader,
{
    /// Create a new account service with injected dependencies.
    ///
    /// Uses the default password cost and the `MatchStored` refresh policy.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `media_uploader` - Remote media host for avatar and cover image
    /// * `token_issuer` - Access and refresh token signer
    pub fn new(
        repository: Arc<AR>,
        media_uploader: Arc<MU>,
        token_issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            repository,
            media_uploader,
            token_issuer,
            password_hasher: PasswordHasher::new(),
            refresh_policy: RefreshPolicy::default(),
        }
    }

    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    pub fn with_refresh_policy(mut self, refresh_policy: RefreshPolicy) -> Self {
        self.refresh_policy = refresh_policy;
        self
    }

    async fn hash_password(&self, password: &Password) -> Result<String, AccountError> {
        let hasher = self.password_hasher.clone();
        let password = password.expose().to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AccountError::Unknown(e.to_string()))?
            .map_err(|e| AccountError::Hashing(e.to_string()))
    }

    async fn verify_password(
        &self,
        password: &Password,
        password_hash: &str,
    ) -> Result<bool, AccountError> {
        let hasher = self.password_hasher.clone();
        let password = password.expose().to_string();
        let password_hash = password_hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
            .await
            .map_err(|e| AccountError::Unknown(e.to_string()))?
            .map_err(|e| AccountError::Hashing(e.to_string()))
    }

    /// Issue a token pair for `account` and persist the refresh token.
    ///
    /// The session is only returned once the refresh token is stored.
    async fn open_session(&self, account: Account) -> Result<Session, AccountError> {
        let access_token = self
            .token_issuer
            .issue_access_token(&account.token_subject())
            .map_err(|e| AccountError::TokenSigning(e.to_string()))?;
        let refresh_token = self
            .token_issuer
            .issue_refresh_token(&account.id.to_string())
            .map_err(|e| AccountError::TokenSigning(e.to_string()))?;

        let account = self
            .repository
            .set_refresh_token(&account.id, Some(refresh_token.clone()))
            .await?;

        Ok(Session {
            account,
            access_token,
            refresh_token,
        })
    }

    async fn find_account(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<AR, MU> AccountServicePort for AccountService<AR, MU>
where
    AR: AccountRepository,
    MU: MediaUploader,
{
    async fn register(&self, command: RegisterCommand) -> Result<Account, AccountError> {
        let lookup = AccountLookup::for_registration(&command.username, &command.email);
        if let Some(existing) = self.repository.find_by_username_or_email(&lookup).await? {
            return Err(if existing.username == command.username {
                AccountError::UsernameAlreadyExists(command.username.to_string())
            } else {
                AccountError::EmailAlreadyExists(command.email.to_string())
            });
        }

        let avatar_path = command.avatar.as_deref().ok_or(AccountError::AvatarRequired)?;
        let avatar = self
            .media_uploader
            .upload(avatar_path)
            .await
            .ok_or(AccountError::AvatarUploadFailed)?;

        let cover_image_url = match command.cover_image.as_deref() {
            Some(path) => match self.media_uploader.upload(path).await {
                Some(media) => Some(media.url),
                None => {
                    tracing::warn!(
                        username = %command.username,
                        "Cover image upload failed, registering without it"
                    );
                    None
                }
            },
            None => None,
        };

        let password_hash = self.hash_password(&command.password).await?;

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            username: command.username,
            email: command.email,
            full_name: command.full_name,
            avatar_url: avatar.url,
            cover_image_url,
            password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.create(account).await?;
        tracing::info!(account_id = %created.id, username = %created.username, "Account registered");

        Ok(created)
    }

    async fn login(&self, command: LoginCommand) -> Result<Session, AccountError> {
        let account = self
            .repository
            .find_by_username_or_email(&command.lookup)
            .await?
            .ok_or(AccountError::NotFound(command.lookup.to_string()))?;

        if !self
            .verify_password(&command.password, &account.password_hash)
            .await?
        {
            tracing::info!(account_id = %account.id, "Login rejected: invalid credentials");
            return Err(AccountError::InvalidCredentials);
        }

        let session = self.open_session(account).await?;
        tracing::info!(account_id = %session.account.id, "Session opened");

        Ok(session)
    }

    async fn logout(&self, id: &AccountId) -> Result<(), AccountError> {
        self.repository.set_refresh_token(id, None).await?;
        tracing::info!(account_id = %id, "Session revoked");
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AccountError> {
        if refresh_token.trim().is_empty() {
            return Err(AccountError::InvalidRefreshToken(
                "refresh token is required".to_string(),
            ));
        }

        let claims = self
            .token_issuer
            .verify_refresh_token(refresh_token)
            .map_err(|e| AccountError::InvalidRefreshToken(e.to_string()))?;
        let id = AccountId::from_string(&claims.sub)
            .map_err(|e| AccountError::InvalidRefreshToken(e.to_string()))?;

        let account = self
            .repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AccountError::InvalidRefreshToken("unknown subject".to_string()))?;

        if self.refresh_policy == RefreshPolicy::MatchStored
            && account.refresh_token.as_deref() != Some(refresh_token)
        {
            tracing::info!(account_id = %account.id, "Refresh rejected: token not current");
            return Err(AccountError::RefreshTokenRevoked);
        }

        self.open_session(account).await
    }

    async fn change_password(
        &self,
        id: &AccountId,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError> {
        let account = self.find_account(id).await?;

        if !self
            .verify_password(&command.old_password, &account.password_hash)
            .await?
        {
            return Err(AccountError::InvalidCredentials);
        }

        let password_hash = self.hash_password(&command.new_password).await?;
        self.repository
            .update_password_hash(id, password_hash)
            .await?;
        tracing::info!(account_id = %id, "Password changed");

        Ok(())
    }

    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.find_account(id).await
    }

    async fn update_details(
        &self,
        id: &AccountId,
        command: UpdateAccountCommand,
    ) -> Result<Account, AccountError> {
        self.repository
            .update_details(id, &command.full_name, &command.email)
            .await
    }
}
