use async_trait::async_trait;
use auth_core::Role;
use auth_core::StoreError;
use auth_core::SubscriptionProbe;
use auth_core::SubscriptionStatus;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::EmailAddress;
use crate::account::models::FullName;
use crate::account::models::ResetToken;
use crate::account::ports::AccountRepository;

const ACCOUNT_COLUMNS: &str = "id, email, full_name, password_hash, role, \
     subscription_status, reset_token_hash, reset_token_expiry, created_at";

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<Account, AccountError> {
        let reset_hash: Option<String> = row.try_get("reset_token_hash").map_db_err()?;
        let reset_expiry: Option<DateTime<Utc>> =
            row.try_get("reset_token_expiry").map_db_err()?;

        // Both-or-neither is enforced by every write path; a half-present
        // pair indicates store corruption.
        let reset_token = match (reset_hash, reset_expiry) {
            (Some(hash), Some(expires_at)) => Some(ResetToken { hash, expires_at }),
            (None, None) => None,
            _ => {
                return Err(AccountError::Database(
                    "reset token hash and expiry out of sync".to_string(),
                ))
            }
        };

        let role: String = row.try_get("role").map_db_err()?;
        let subscription: String = row.try_get("subscription_status").map_db_err()?;

        Ok(Account {
            id: AccountId(row.try_get::<Uuid, _>("id").map_db_err()?),
            email: EmailAddress::new(row.try_get("email").map_db_err()?)?,
            full_name: FullName::new(row.try_get("full_name").map_db_err()?)?,
            password_hash: row.try_get("password_hash").map_db_err()?,
            role: role.parse::<Role>().map_err(AccountError::Database)?,
            subscription: subscription
                .parse::<SubscriptionStatus>()
                .map_err(AccountError::Database)?,
            reset_token,
            created_at: row.try_get("created_at").map_db_err()?,
        })
    }
}

trait MapDbErr<T> {
    fn map_db_err(self) -> Result<T, AccountError>;
}

impl<T> MapDbErr<T> for Result<T, sqlx::Error> {
    fn map_db_err(self) -> Result<T, AccountError> {
        self.map_err(|e| AccountError::Database(e.to_string()))
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        sqlx::query(
            "INSERT INTO accounts \
                 (id, email, full_name, password_hash, role, subscription_status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(account.full_name.as_str())
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.subscription.as_str())
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AccountError::EmailAlreadyExists(
                        account.email.as_str().to_string(),
                    );
                }
            }
            AccountError::Database(e.to_string())
        })?;

        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn update_full_name(
        &self,
        id: &AccountId,
        full_name: &FullName,
    ) -> Result<Account, AccountError> {
        let row = sqlx::query(&format!(
            "UPDATE accounts SET full_name = $2 WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id.0)
        .bind(full_name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        row.as_ref()
            .map(Self::map_row)
            .transpose()?
            .ok_or(AccountError::NotFound(id.to_string()))
    }

    async fn update_password(
        &self,
        id: &AccountId,
        password_hash: &str,
    ) -> Result<(), AccountError> {
        let result = sqlx::query("UPDATE accounts SET password_hash = $2 WHERE id = $1")
            .bind(id.0)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_db_err()?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn update_role(&self, id: &AccountId, role: Role) -> Result<Account, AccountError> {
        let row = sqlx::query(&format!(
            "UPDATE accounts SET role = $2 WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id.0)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        row.as_ref()
            .map(Self::map_row)
            .transpose()?
            .ok_or(AccountError::NotFound(id.to_string()))
    }

    async fn update_subscription(
        &self,
        id: &AccountId,
        status: SubscriptionStatus,
    ) -> Result<Account, AccountError> {
        let row = sqlx::query(&format!(
            "UPDATE accounts SET subscription_status = $2 WHERE id = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id.0)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        row.as_ref()
            .map(Self::map_row)
            .transpose()?
            .ok_or(AccountError::NotFound(id.to_string()))
    }

    async fn begin_password_reset(
        &self,
        email: &EmailAddress,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<AccountId>, AccountError> {
        // Hash and expiry are written together; any outstanding pair is
        // overwritten, which invalidates the previous secret.
        let row = sqlx::query(
            "UPDATE accounts \
             SET reset_token_hash = $2, reset_token_expiry = $3 \
             WHERE email = $1 \
             RETURNING id",
        )
        .bind(email.as_str())
        .bind(token_hash)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        row.map(|r| r.try_get::<Uuid, _>("id").map_db_err().map(AccountId))
            .transpose()
    }

    async fn abort_password_reset(
        &self,
        id: &AccountId,
        token_hash: &str,
    ) -> Result<(), AccountError> {
        // Conditional on the hash so a concurrently minted newer secret
        // survives the rollback. Zero rows affected is fine.
        sqlx::query(
            "UPDATE accounts \
             SET reset_token_hash = NULL, reset_token_expiry = NULL \
             WHERE id = $1 AND reset_token_hash = $2",
        )
        .bind(id.0)
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_db_err()?;

        Ok(())
    }

    async fn redeem_password_reset(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, AccountError> {
        // Match-and-clear in one statement: of two racing redemptions the
        // row predicate can hold for only one.
        let row = sqlx::query(&format!(
            "UPDATE accounts \
             SET password_hash = $2, reset_token_hash = NULL, reset_token_expiry = NULL \
             WHERE reset_token_hash = $1 AND reset_token_expiry > $3 \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(token_hash)
        .bind(password_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_db_err()?;

        row.as_ref().map(Self::map_row).transpose()
    }
}

#[async_trait]
impl SubscriptionProbe for PostgresAccountRepository {
    async fn subscription_status(
        &self,
        account_id: &str,
    ) -> Result<SubscriptionStatus, StoreError> {
        let id = AccountId::from_string(account_id)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let row = sqlx::query("SELECT subscription_status FROM accounts WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        // A vanished account has no subscription; the gate refuses it.
        let Some(row) = row else {
            return Ok(SubscriptionStatus::None);
        };

        let status: String = row
            .try_get("subscription_status")
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        status.parse().map_err(StoreError::Unavailable)
    }
}
