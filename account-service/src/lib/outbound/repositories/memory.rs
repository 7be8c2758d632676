use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountLookup;
use crate::account::models::EmailAddress;
use crate::account::models::FullName;
use crate::account::ports::AccountRepository;

/// Process-local account store.
///
/// Enforces the same username and email uniqueness as the `accounts` table.
/// Used for development runs and the HTTP test suite.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    async fn modify<F>(&self, id: &AccountId, apply: F) -> Result<Account, AccountError>
    where
        F: FnOnce(&mut Account) + Send,
    {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(id)
            .ok_or(AccountError::NotFound(id.to_string()))?;
        apply(account);
        account.updated_at = Utc::now();
        Ok(account.clone())
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.write().await;

        for existing in accounts.values() {
            if existing.username == account.username {
                return Err(AccountError::UsernameAlreadyExists(
                    account.username.to_string(),
                ));
            }
            if existing.email == account.email {
                return Err(AccountError::EmailAlreadyExists(account.email.to_string()));
            }
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_username_or_email(
        &self,
        lookup: &AccountLookup,
    ) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.read().await;
        let mut matches: Vec<&Account> = accounts
            .values()
            .filter(|account| lookup.matches(&account.username, &account.email))
            .collect();
        matches.sort_by_key(|account| account.created_at);

        Ok(matches.first().map(|account| (*account).clone()))
    }

    async fn set_refresh_token(
        &self,
        id: &AccountId,
        refresh_token: Option<String>,
    ) -> Result<Account, AccountError> {
        self.modify(id, |account| account.refresh_token = refresh_token)
            .await
    }

    async fn update_password_hash(
        &self,
        id: &AccountId,
        password_hash: String,
    ) -> Result<Account, AccountError> {
        self.modify(id, |account| account.password_hash = password_hash)
            .await
    }

    async fn update_details(
        &self,
        id: &AccountId,
        full_name: &FullName,
        email: &EmailAddress,
    ) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.write().await;

        if accounts
            .values()
            .any(|account| account.id != *id && account.email == *email)
        {
            return Err(AccountError::EmailAlreadyExists(email.to_string()));
        }

        let account = accounts
            .get_mut(id)
            .ok_or(AccountError::NotFound(id.to_string()))?;
        account.full_name = full_name.clone();
        account.email = email.clone();
        account.updated_at = Utc::now();

        Ok(account.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::models::Username;

    fn account(username: &str, email: &str) -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(),
            username: Username::new(username).unwrap(),
            email: EmailAddress::new(email).unwrap(),
            full_name: FullName::new("Test Account").unwrap(),
            avatar_url: "https://media.example.com/a.png".to_string(),
            cover_image_url: None,
            password_hash: "$argon2id$test_hash".to_string(),
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_enforces_uniqueness() {
        let repository = InMemoryAccountRepository::new();
        repository.create(account("sam", "sam@x.com")).await.unwrap();

        let result = repository.create(account("sam", "other@x.com")).await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::UsernameAlreadyExists(_)
        ));

        let result = repository.create(account("alex", "sam@x.com")).await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::EmailAlreadyExists(_)
        ));

        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_find_by_username_or_email() {
        let repository = InMemoryAccountRepository::new();
        let created = repository.create(account("sam", "sam@x.com")).await.unwrap();

        let lookup = AccountLookup::for_login(None, Some("SAM@x.com")).unwrap();
        let found = repository
            .find_by_username_or_email(&lookup)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);

        let lookup = AccountLookup::for_login(Some("nobody"), None).unwrap();
        assert!(repository
            .find_by_username_or_email(&lookup)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_set_refresh_token_leaves_password_hash() {
        let repository = InMemoryAccountRepository::new();
        let created = repository.create(account("sam", "sam@x.com")).await.unwrap();

        let updated = repository
            .set_refresh_token(&created.id, Some("token".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.refresh_token.as_deref(), Some("token"));
        assert_eq!(updated.password_hash, created.password_hash);
        assert!(updated.updated_at >= created.updated_at);

        let cleared = repository.set_refresh_token(&created.id, None).await.unwrap();
        assert_eq!(cleared.refresh_token, None);
    }

    #[tokio::test]
    async fn test_update_unknown_account() {
        let repository = InMemoryAccountRepository::new();
        let result = repository
            .update_password_hash(&AccountId::new(), "hash".to_string())
            .await;
        assert!(matches!(result.unwrap_err(), AccountError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_details_rejects_taken_email() {
        let repository = InMemoryAccountRepository::new();
        let sam = repository.create(account("sam", "sam@x.com")).await.unwrap();
        repository.create(account("alex", "alex@x.com")).await.unwrap();

        let result = repository
            .update_details(
                &sam.id,
                &FullName::new("Sam R").unwrap(),
                &EmailAddress::new("alex@x.com").unwrap(),
            )
            .await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::EmailAlreadyExists(_)
        ));

        let updated = repository
            .update_details(
                &sam.id,
                &FullName::new("Sam R").unwrap(),
                &EmailAddress::new("sam@x.com").unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(updated.full_name.as_str(), "Sam R");
    }
}
