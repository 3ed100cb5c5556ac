use async_trait::async_trait;
use auth_core::StoreError;
use auth_core::SubscriptionProbe;
use auth_core::SubscriptionStatus;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

/// Read-only probe into the credential store.
///
/// Subscriber-only routes re-fetch the current status here instead of
/// trusting the snapshot embedded in the token.
pub struct PostgresSubscriptionProbe {
    pool: PgPool,
}

impl PostgresSubscriptionProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionProbe for PostgresSubscriptionProbe {
    async fn subscription_status(
        &self,
        account_id: &str,
    ) -> Result<SubscriptionStatus, StoreError> {
        let id =
            Uuid::parse_str(account_id).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let row = sqlx::query("SELECT subscription_status FROM accounts WHERE id = $1")
            .bind(id)
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
