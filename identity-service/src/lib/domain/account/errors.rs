use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for FullName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FullNameError {
    #[error("Name too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for reset-notification delivery
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Failed to serialize notification: {0}")]
    SerializationFailed(String),

    #[error("Failed to deliver notification: {0}")]
    DeliveryFailed(String),

    #[error("Notification delivery timed out: {0}")]
    Timeout(String),
}

/// Top-level error for all account operations
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    // Value object validation errors
    #[error("Invalid account ID: {0}")]
    InvalidAccountId(#[from] AccountIdError),

    #[error("Invalid name: {0}")]
    InvalidFullName(#[from] FullNameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    // Domain-level errors
    #[error("Account not found: {0}")]
    NotFound(String),

    /// Reset requested for an identity that does not exist. Internal only:
    /// handlers collapse this into the same generic response as a valid
    /// request so account existence cannot be enumerated.
    #[error("No account with the requested identity")]
    UnknownIdentity,

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Presented reset secret is wrong, expired, or already redeemed. The
    /// causes are deliberately indistinguishable to the caller.
    #[error("Token is invalid or expired")]
    InvalidOrExpiredToken,

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(#[from] auth_core::PasswordError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        AccountError::Database(err.to_string())
    }
}
