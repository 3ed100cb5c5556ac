use std::sync::Arc;

use async_trait::async_trait;
use auth_core::reset;
use auth_core::PasswordHasher;
use auth_core::Role;
use auth_core::SubscriptionStatus;
use chrono::Duration;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::EmailAddress;
use crate::account::models::FullName;
use crate::account::models::RegisterCommand;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;
use crate::account::ports::ResetNotifier;

/// Domain service for account operations, including the reset-token
/// lifecycle.
///
/// Concrete implementation of AccountServicePort with dependency injection.
pub struct AccountService<AR, RN>
where
    AR: AccountRepository,
    RN: ResetNotifier,
{
    repository: Arc<AR>,
    notifier: Arc<RN>,
    password_hasher: PasswordHasher,
    reset_window: Duration,
}

impl<AR, RN> AccountService<AR, RN>
where
    AR: AccountRepository,
    RN: ResetNotifier,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `notifier` - Out-of-band reset-secret delivery
    /// * `password_hasher` - Hasher configured with the service's cost factor
    /// * `reset_window` - Validity window for freshly minted reset secrets
    pub fn new(
        repository: Arc<AR>,
        notifier: Arc<RN>,
        password_hasher: PasswordHasher,
        reset_window: Duration,
    ) -> Self {
        Self {
            repository,
            notifier,
            password_hasher,
            reset_window,
        }
    }
}

#[async_trait]
impl<AR, RN> AccountServicePort for AccountService<AR, RN>
where
    AR: AccountRepository,
    RN: ResetNotifier,
{
    async fn register(&self, command: RegisterCommand) -> Result<Account, AccountError> {
        let password_hash = self.password_hasher.hash(&command.password)?;

        let account = Account {
            id: AccountId::new(),
            email: command.email,
            full_name: command.full_name,
            password_hash,
            role: Role::default(),
            subscription: SubscriptionStatus::default(),
            reset_token: None,
            created_at: Utc::now(),
        };

        let created = self.repository.create(account).await?;

        tracing::info!(account_id = %created.id, "Account registered");

        Ok(created)
    }

    async fn authenticate(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<Account, AccountError> {
        // Unknown identity and wrong password collapse into one refusal.
        let account = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !self.password_hasher.verify(password, &account.password_hash) {
            return Err(AccountError::InvalidCredentials);
        }

        Ok(account)
    }

    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }

    async fn update_profile(
        &self,
        id: &AccountId,
        full_name: FullName,
    ) -> Result<Account, AccountError> {
        self.repository.update_full_name(id, &full_name).await
    }

    async fn change_password(
        &self,
        id: &AccountId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let account = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))?;

        if !self
            .password_hasher
            .verify(current_password, &account.password_hash)
        {
            return Err(AccountError::InvalidCredentials);
        }

        let password_hash = self.password_hasher.hash(new_password)?;
        self.repository.update_password(id, &password_hash).await?;

        tracing::info!(account_id = %id, "Password changed");

        Ok(())
    }

    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), AccountError> {
        let secret = reset::generate_secret();
        let token_hash = reset::hash_secret(&secret);
        let expires_at = Utc::now() + self.reset_window;

        // One conditional write: mints the new pair and invalidates any
        // outstanding secret for this account.
        let account_id = self
            .repository
            .begin_password_reset(email, &token_hash, expires_at)
            .await?
            .ok_or(AccountError::UnknownIdentity)?;

        if let Err(e) = self
            .notifier
            .send_reset_secret(email, &secret, expires_at)
            .await
        {
            tracing::error!(
                account_id = %account_id,
                error = %e,
                "Reset notification failed, rolling back reset material"
            );

            // Conditional on the hash we just wrote, so a concurrent newer
            // request is never clobbered.
            self.repository
                .abort_password_reset(&account_id, &token_hash)
                .await?;

            return Err(e.into());
        }

        tracing::info!(account_id = %account_id, "Password reset requested");

        Ok(())
    }

    async fn reset_password(
        &self,
        secret: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let token_hash = reset::hash_secret(secret);
        let password_hash = self.password_hasher.hash(new_password)?;

        // Match-and-clear happens in a single store statement; of two racing
        // redemptions only one can see a live match.
        let account = self
            .repository
            .redeem_password_reset(&token_hash, &password_hash, Utc::now())
            .await?
            .ok_or(AccountError::InvalidOrExpiredToken)?;

        tracing::info!(account_id = %account.id, "Password reset redeemed");

        Ok(())
    }

    async fn update_role(&self, id: &AccountId, role: Role) -> Result<Account, AccountError> {
        let account = self.repository.update_role(id, role).await?;

        tracing::info!(account_id = %id, role = %role, "Role updated");

        Ok(account)
    }

    async fn update_subscription(
        &self,
        id: &AccountId,
        status: SubscriptionStatus,
    ) -> Result<Account, AccountError> {
        let account = self.repository.update_subscription(id, status).await?;

        tracing::info!(account_id = %id, status = %status, "Subscription updated");

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::DateTime;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::account::errors::NotificationError;

    mock! {
        pub TestAccountRepository {}

        #[async_trait]
        impl AccountRepository for TestAccountRepository {
            async fn create(&self, account: Account) -> Result<Account, AccountError>;
            async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError>;
            async fn update_full_name(&self, id: &AccountId, full_name: &FullName) -> Result<Account, AccountError>;
            async fn update_password(&self, id: &AccountId, password_hash: &str) -> Result<(), AccountError>;
            async fn update_role(&self, id: &AccountId, role: Role) -> Result<Account, AccountError>;
            async fn update_subscription(&self, id: &AccountId, status: SubscriptionStatus) -> Result<Account, AccountError>;
            async fn begin_password_reset(&self, email: &EmailAddress, token_hash: &str, expires_at: DateTime<Utc>) -> Result<Option<AccountId>, AccountError>;
            async fn abort_password_reset(&self, id: &AccountId, token_hash: &str) -> Result<(), AccountError>;
            async fn redeem_password_reset(&self, token_hash: &str, password_hash: &str, now: DateTime<Utc>) -> Result<Option<Account>, AccountError>;
        }
    }

    mock! {
        pub TestResetNotifier {}

        #[async_trait]
        impl ResetNotifier for TestResetNotifier {
            async fn send_reset_secret(&self, email: &EmailAddress, secret: &str, deadline: DateTime<Utc>) -> Result<(), NotificationError>;
        }
    }

    fn service(
        repository: MockTestAccountRepository,
        notifier: MockTestResetNotifier,
    ) -> AccountService<MockTestAccountRepository, MockTestResetNotifier> {
        AccountService::new(
            Arc::new(repository),
            Arc::new(notifier),
            PasswordHasher::default(),
            Duration::minutes(15),
        )
    }

    fn email(s: &str) -> EmailAddress {
        EmailAddress::new(s.to_string()).unwrap()
    }

    fn test_account(password_hash: String) -> Account {
        Account {
            id: AccountId::new(),
            email: email("alice@example.com"),
            full_name: FullName::new("Alice Smith".to_string()).unwrap(),
            password_hash,
            role: Role::User,
            subscription: SubscriptionStatus::None,
            reset_token: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_defaults() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestResetNotifier::new();

        repository
            .expect_create()
            .withf(|account| {
                account.password_hash.starts_with("$argon2")
                    && account.role == Role::User
                    && account.subscription == SubscriptionStatus::None
                    && account.reset_token.is_none()
            })
            .times(1)
            .returning(|account| Ok(account));

        let service = service(repository, notifier);

        let command = RegisterCommand::new(
            FullName::new("Alice Smith".to_string()).unwrap(),
            email("alice@example.com"),
            "password123".to_string(),
        );

        let account = service.register(command).await.unwrap();
        assert_ne!(account.password_hash, "password123");
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestResetNotifier::new();

        repository.expect_create().times(1).returning(|account| {
            Err(AccountError::EmailAlreadyExists(
                account.email.as_str().to_string(),
            ))
        });

        let service = service(repository, notifier);

        let command = RegisterCommand::new(
            FullName::new("Alice Smith".to_string()).unwrap(),
            email("alice@example.com"),
            "password123".to_string(),
        );

        let result = service.register(command).await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let hasher = PasswordHasher::default();
        let stored = test_account(hasher.hash("password123").unwrap());

        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestResetNotifier::new();

        let returned = stored.clone();
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let service = service(repository, notifier);

        let account = service
            .authenticate(&email("alice@example.com"), "password123")
            .await
            .unwrap();
        assert_eq!(account.id, stored.id);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let hasher = PasswordHasher::default();
        let stored = test_account(hasher.hash("password123").unwrap());

        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestResetNotifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let service = service(repository, notifier);

        let result = service
            .authenticate(&email("alice@example.com"), "wrong_password")
            .await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email_same_refusal() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestResetNotifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, notifier);

        let result = service
            .authenticate(&email("nobody@example.com"), "password123")
            .await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_request_reset_persists_hash_not_secret() {
        let mut repository = MockTestAccountRepository::new();
        let mut notifier = MockTestResetNotifier::new();

        let account_id = AccountId::new();
        let written_hash: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let captured = Arc::clone(&written_hash);
        repository
            .expect_begin_password_reset()
            .withf(|_, token_hash, expires_at| {
                // A sha256 hex digest, expiring in the future.
                token_hash.len() == 64 && *expires_at > Utc::now()
            })
            .times(1)
            .returning(move |_, token_hash, _| {
                *captured.lock().unwrap() = Some(token_hash.to_string());
                Ok(Some(account_id))
            });

        let stored = Arc::clone(&written_hash);
        notifier
            .expect_send_reset_secret()
            .withf(move |_, secret, _| {
                // The delivered plaintext hashes to exactly what was stored.
                let hash = stored.lock().unwrap().clone().unwrap();
                reset::hash_secret(secret) == hash && secret.len() == 40
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(repository, notifier);

        service
            .request_password_reset(&email("alice@example.com"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_request_reset_unknown_identity() {
        let mut repository = MockTestAccountRepository::new();
        let mut notifier = MockTestResetNotifier::new();

        repository
            .expect_begin_password_reset()
            .times(1)
            .returning(|_, _, _| Ok(None));

        notifier.expect_send_reset_secret().times(0);

        let service = service(repository, notifier);

        let result = service
            .request_password_reset(&email("nobody@example.com"))
            .await;
        assert!(matches!(result.unwrap_err(), AccountError::UnknownIdentity));
    }

    #[tokio::test]
    async fn test_request_reset_rolls_back_on_delivery_failure() {
        let mut repository = MockTestAccountRepository::new();
        let mut notifier = MockTestResetNotifier::new();

        let account_id = AccountId::new();
        let written_hash: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let captured = Arc::clone(&written_hash);
        repository
            .expect_begin_password_reset()
            .times(1)
            .returning(move |_, token_hash, _| {
                *captured.lock().unwrap() = Some(token_hash.to_string());
                Ok(Some(account_id))
            });

        notifier
            .expect_send_reset_secret()
            .times(1)
            .returning(|_, _, _| {
                Err(NotificationError::DeliveryFailed(
                    "broker unreachable".to_string(),
                ))
            });

        let stored = Arc::clone(&written_hash);
        repository
            .expect_abort_password_reset()
            .withf(move |id, token_hash| {
                // Rollback targets exactly the material just written.
                *id == account_id
                    && Some(token_hash.to_string()) == *stored.lock().unwrap()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(repository, notifier);

        let result = service
            .request_password_reset(&email("alice@example.com"))
            .await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::Notification(_)
        ));
    }

    #[tokio::test]
    async fn test_reset_password_redeems_hashed_secret() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestResetNotifier::new();

        let secret = reset::generate_secret();
        let expected_hash = reset::hash_secret(&secret);

        let redeemed = test_account("$argon2id$old".to_string());
        repository
            .expect_redeem_password_reset()
            .withf(move |token_hash, password_hash, _| {
                token_hash == expected_hash && password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(move |_, _, _| Ok(Some(redeemed.clone())));

        let service = service(repository, notifier);

        service
            .reset_password(&secret, "new_password")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reset_password_no_match_is_invalid_or_expired() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestResetNotifier::new();

        repository
            .expect_redeem_password_reset()
            .times(1)
            .returning(|_, _, _| Ok(None));

        let service = service(repository, notifier);

        let result = service
            .reset_password("0000000000000000000000000000000000000000", "new_password")
            .await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::InvalidOrExpiredToken
        ));
    }

    #[tokio::test]
    async fn test_reset_password_is_single_use() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestResetNotifier::new();

        let secret = reset::generate_secret();
        let redeemed = test_account("$argon2id$old".to_string());

        // First redemption matches and clears; the second sees nothing.
        let calls = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&calls);
        repository
            .expect_redeem_password_reset()
            .times(2)
            .returning(move |_, _, _| {
                let mut count = counter.lock().unwrap();
                *count += 1;
                if *count == 1 {
                    Ok(Some(redeemed.clone()))
                } else {
                    Ok(None)
                }
            });

        let service = service(repository, notifier);

        service.reset_password(&secret, "first_new").await.unwrap();

        let result = service.reset_password(&secret, "second_new").await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::InvalidOrExpiredToken
        ));
    }

    #[tokio::test]
    async fn test_second_request_invalidates_first_secret() {
        let mut repository = MockTestAccountRepository::new();
        let mut notifier = MockTestResetNotifier::new();

        let account_id = AccountId::new();

        // The repository holds one reset pair per account; every begin
        // overwrites it.
        let stored_hash: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let writer = Arc::clone(&stored_hash);
        repository
            .expect_begin_password_reset()
            .times(2)
            .returning(move |_, token_hash, _| {
                *writer.lock().unwrap() = Some(token_hash.to_string());
                Ok(Some(account_id))
            });

        let delivered: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let outbox = Arc::clone(&delivered);
        notifier
            .expect_send_reset_secret()
            .times(2)
            .returning(move |_, secret, _| {
                outbox.lock().unwrap().push(secret.to_string());
                Ok(())
            });

        let store = Arc::clone(&stored_hash);
        repository
            .expect_redeem_password_reset()
            .times(1)
            .returning(move |token_hash, _, _| {
                if Some(token_hash.to_string()) == *store.lock().unwrap() {
                    Ok(Some(test_account("$argon2id$old".to_string())))
                } else {
                    Ok(None)
                }
            });

        let service = service(repository, notifier);

        service
            .request_password_reset(&email("alice@example.com"))
            .await
            .unwrap();
        service
            .request_password_reset(&email("alice@example.com"))
            .await
            .unwrap();

        let first_secret = delivered.lock().unwrap()[0].clone();
        let result = service.reset_password(&first_secret, "new_password").await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::InvalidOrExpiredToken
        ));
    }

    #[tokio::test]
    async fn test_change_password_verifies_current() {
        let hasher = PasswordHasher::default();
        let stored = test_account(hasher.hash("current_pw").unwrap());
        let account_id = stored.id;

        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestResetNotifier::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        repository
            .expect_update_password()
            .withf(|_, password_hash| password_hash.starts_with("$argon2"))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(repository, notifier);

        service
            .change_password(&account_id, "current_pw", "next_pw_123")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_change_password_wrong_current() {
        let hasher = PasswordHasher::default();
        let stored = test_account(hasher.hash("current_pw").unwrap());
        let account_id = stored.id;

        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestResetNotifier::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        repository.expect_update_password().times(0);

        let service = service(repository, notifier);

        let result = service
            .change_password(&account_id, "wrong_pw", "next_pw_123")
            .await;
        assert!(matches!(
            result.unwrap_err(),
            AccountError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_update_role_and_subscription() {
        let mut repository = MockTestAccountRepository::new();
        let notifier = MockTestResetNotifier::new();

        let stored = test_account("$argon2id$hash".to_string());
        let account_id = stored.id;

        let promoted = stored.clone();
        repository
            .expect_update_role()
            .with(eq(account_id), eq(Role::Admin))
            .times(1)
            .returning(move |_, _| {
                let mut account = promoted.clone();
                account.role = Role::Admin;
                Ok(account)
            });

        let subscribed = stored.clone();
        repository
            .expect_update_subscription()
            .with(eq(account_id), eq(SubscriptionStatus::Active))
            .times(1)
            .returning(move |_, _| {
                let mut account = subscribed.clone();
                account.subscription = SubscriptionStatus::Active;
                Ok(account)
            });

        let service = service(repository, notifier);

        let account = service.update_role(&account_id, Role::Admin).await.unwrap();
        assert_eq!(account.role, Role::Admin);

        let account = service
            .update_subscription(&account_id, SubscriptionStatus::Active)
            .await
            .unwrap();
        assert_eq!(account.subscription, SubscriptionStatus::Active);
    }
}
