use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountLookup;
use crate::account::models::EmailAddress;
use crate::account::models::FullName;
use crate::account::models::Username;
use crate::account::ports::AccountRepository;

const ACCOUNT_COLUMNS: &str = "id, username, email, full_name, avatar_url, cover_image_url, \
     password_hash, refresh_token, created_at, updated_at";

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    email: String,
    full_name: String,
    avatar_url: String,
    cover_image_url: Option<String>,
    password_hash: String,
    refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AccountError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: AccountId(row.id),
            username: Username::new(&row.username)?,
            email: EmailAddress::new(&row.email)?,
            full_name: FullName::new(&row.full_name)?,
            avatar_url: row.avatar_url,
            cover_image_url: row.cover_image_url,
            password_hash: row.password_hash,
            refresh_token: row.refresh_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map unique-constraint violations to their domain conflict.
fn map_write_error(e: sqlx::Error, username: &str, email: &str) -> AccountError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("accounts_username_key") {
                return AccountError::UsernameAlreadyExists(username.to_string());
            }
            if db_err.constraint() == Some("accounts_email_key") {
                return AccountError::EmailAlreadyExists(email.to_string());
            }
        }
    }
    AccountError::DatabaseError(e.to_string())
}

fn updated(row: Option<AccountRow>, id: &AccountId) -> Result<Account, AccountError> {
    row.ok_or(AccountError::NotFound(id.to_string()))?
        .try_into()
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        let sql = format!(
            r#"
            INSERT INTO accounts ({ACCOUNT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account.id.0)
            .bind(account.username.as_str())
            .bind(account.email.as_str())
            .bind(account.full_name.as_str())
            .bind(&account.avatar_url)
            .bind(&account.cover_image_url)
            .bind(&account.password_hash)
            .bind(&account.refresh_token)
            .bind(account.created_at)
            .bind(account.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, account.username.as_str(), account.email.as_str()))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_username_or_email(
        &self,
        lookup: &AccountLookup,
    ) -> Result<Option<Account>, AccountError> {
        let sql = format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            WHERE ($1::text IS NOT NULL AND username = $1)
               OR ($2::text IS NOT NULL AND email = $2)
            ORDER BY created_at
            LIMIT 1
            "#
        );

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(&lookup.username)
            .bind(&lookup.email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(Account::try_from).transpose()
    }

    async fn set_refresh_token(
        &self,
        id: &AccountId,
        refresh_token: Option<String>,
    ) -> Result<Account, AccountError> {
        let sql = format!(
            r#"
            UPDATE accounts
            SET refresh_token = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .bind(refresh_token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        updated(row, id)
    }

    async fn update_password_hash(
        &self,
        id: &AccountId,
        password_hash: String,
    ) -> Result<Account, AccountError> {
        let sql = format!(
            r#"
            UPDATE accounts
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        updated(row, id)
    }

    async fn update_details(
        &self,
        id: &AccountId,
        full_name: &FullName,
        email: &EmailAddress,
    ) -> Result<Account, AccountError> {
        let sql = format!(
            r#"
            UPDATE accounts
            SET full_name = $2, email = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .bind(full_name.as_str())
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "", email.as_str()))?;

        updated(row, id)
    }
}
