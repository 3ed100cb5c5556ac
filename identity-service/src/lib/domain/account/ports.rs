use async_trait::async_trait;
use auth_core::Role;
use auth_core::SubscriptionStatus;
use chrono::DateTime;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::errors::NotificationError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::EmailAddress;
use crate::account::models::FullName;
use crate::account::models::RegisterCommand;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account with a hashed password and default role.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Identity is already registered
    /// * `Password` - Hashing was unavailable
    /// * `Database` - Store operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Account, AccountError>;

    /// Verify credentials for login.
    ///
    /// Unknown identity and wrong password both return `InvalidCredentials`
    /// so the refusal does not reveal which part failed.
    async fn authenticate(&self, email: &EmailAddress, password: &str)
        -> Result<Account, AccountError>;

    /// Retrieve account by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Database` - Store operation failed
    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError>;

    /// Update the display name.
    async fn update_profile(
        &self,
        id: &AccountId,
        full_name: FullName,
    ) -> Result<Account, AccountError>;

    /// Replace the password after verifying the current one.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Current password does not match
    async fn change_password(
        &self,
        id: &AccountId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError>;

    /// Begin the reset lifecycle: mint a secret, persist its hash and
    /// expiry, and hand the plaintext to the notification collaborator.
    ///
    /// A new request overwrites any outstanding secret. If delivery fails
    /// the just-written reset material is rolled back and the error
    /// propagates; no redeemable secret is left that nobody received.
    ///
    /// # Errors
    /// * `UnknownIdentity` - No account with this email. Internal only;
    ///   handlers must respond as if the request succeeded.
    /// * `Notification` - Delivery failed (reset material rolled back)
    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), AccountError>;

    /// Redeem a reset secret: match its hash and an unexpired window, set
    /// the new password, and clear the reset material, all in one
    /// conditional store write. Single-use by construction.
    ///
    /// # Errors
    /// * `InvalidOrExpiredToken` - No live match (wrong, expired, or
    ///   already redeemed; indistinguishable by design)
    async fn reset_password(&self, secret: &str, new_password: &str)
        -> Result<(), AccountError>;

    /// Privileged role mutation.
    async fn update_role(&self, id: &AccountId, role: Role) -> Result<Account, AccountError>;

    /// Privileged subscription mutation.
    async fn update_subscription(
        &self,
        id: &AccountId,
        status: SubscriptionStatus,
    ) -> Result<Account, AccountError>;
}

/// Persistence operations for the credential store.
///
/// Point lookups only; the reset operations are single conditional writes so
/// redemption races resolve at the store, never via read-then-write in the
/// service.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Identity is already registered
    /// * `Database` - Store operation failed
    async fn create(&self, account: Account) -> Result<Account, AccountError>;

    /// Point lookup by identifier.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Point lookup by normalized email identity.
    async fn find_by_email(&self, email: &EmailAddress)
        -> Result<Option<Account>, AccountError>;

    /// Replace the display name.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn update_full_name(
        &self,
        id: &AccountId,
        full_name: &FullName,
    ) -> Result<Account, AccountError>;

    /// Replace the password hash.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn update_password(
        &self,
        id: &AccountId,
        password_hash: &str,
    ) -> Result<(), AccountError>;

    /// Replace the role.
    async fn update_role(&self, id: &AccountId, role: Role) -> Result<Account, AccountError>;

    /// Replace the subscription status.
    async fn update_subscription(
        &self,
        id: &AccountId,
        status: SubscriptionStatus,
    ) -> Result<Account, AccountError>;

    /// Write fresh reset material (hash + expiry together) onto the account
    /// with the given identity, overwriting any outstanding pair.
    ///
    /// Returns the account id, or `None` when no such identity exists.
    async fn begin_password_reset(
        &self,
        email: &EmailAddress,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<AccountId>, AccountError>;

    /// Clear reset material only if it still matches `token_hash`, so a
    /// rollback never clobbers a newer request's material.
    async fn abort_password_reset(
        &self,
        id: &AccountId,
        token_hash: &str,
    ) -> Result<(), AccountError>;

    /// Atomic conditional redemption: where the stored hash matches and the
    /// expiry is after `now`, set the new password hash and clear both reset
    /// columns in the same statement. Returns the redeemed account, or
    /// `None` when nothing matched. Of two racing redemptions exactly one
    /// can observe a match.
    async fn redeem_password_reset(
        &self,
        token_hash: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, AccountError>;
}

/// Out-of-band delivery of a freshly minted reset secret.
#[async_trait]
pub trait ResetNotifier: Send + Sync + 'static {
    /// Hand off (destination identity, plaintext secret, delivery deadline)
    /// for out-of-band delivery. The plaintext is transmitted exactly once
    /// and never persisted by either side of this port.
    async fn send_reset_secret(
        &self,
        email: &EmailAddress,
        secret: &str,
        deadline: DateTime<Utc>,
    ) -> Result<(), NotificationError>;
}
